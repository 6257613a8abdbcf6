//! Administrator decisions on staged orders, stored orders, bonus
//! withdrawals and profile edits
//!
//! A decision never changes the acting admin's own dialogue. Every
//! request is removed by its first decision, so a second press reports
//! "not found".

use shared::models::OrderRecord;
use shared::{OrderRef, UserId};
use tracing::{info, warn};

use super::token::Token;
use super::{Context, Engine, EngineError, EngineResult, menu, texts};
use crate::settlement::{self, Confirmation, StoredDecision};

impl Engine {
    pub(super) async fn decide(&self, ctx: &mut Context, token: Token) -> EngineResult<()> {
        match token {
            Token::ConfirmOrder(customer_id) => self.confirm_staged(ctx, customer_id).await,
            Token::RejectOrder(customer_id) => self.reject_staged(ctx, customer_id).await,
            Token::ConfirmStoredOrder(reference) => self.decide_stored(ctx, reference, true).await,
            Token::RejectStoredOrder(reference) => self.decide_stored(ctx, reference, false).await,
            Token::ApproveBonus(customer_id) => self.approve_bonus(ctx, customer_id).await,
            Token::RejectBonus(customer_id) => self.reject_bonus(ctx, customer_id).await,
            Token::ApproveEdit(customer_id) => self.approve_edit(ctx, customer_id).await,
            Token::RejectEdit(customer_id) => self.reject_edit(ctx, customer_id).await,
            other => Err(EngineError::invariant(format!("{other} is not a decision"))),
        }
    }

    // ── Staged orders ──

    async fn confirm_staged(&self, ctx: &mut Context, customer_id: UserId) -> EngineResult<()> {
        let session = ctx.session_of(self.sessions.as_ref(), customer_id);
        let Some(staged) = session.staged_order.clone() else {
            ctx.reply(texts::ORDER_NOT_FOUND);
            return Ok(());
        };

        match settlement::confirm_order(self.store.as_ref(), &staged).await? {
            // Stage kept so the order can be decided again once resolved
            Confirmation::CustomerMissing => {
                warn!(customer_id, stage_id = %staged.id, "Staged order without customer");
                ctx.reply(texts::CUSTOMER_NOT_FOUND);
            }
            Confirmation::Confirmed {
                customer, balance, ..
            } => {
                ctx.session_of(self.sessions.as_ref(), customer_id).staged_order = None;
                let balance = balance.unwrap_or(customer.bonus);
                ctx.send(
                    customer_id,
                    texts::order_confirmed(&staged.order, customer.role, balance),
                    None,
                );
                ctx.reply(texts::ADMIN_ORDER_CONFIRMED);
            }
        }
        Ok(())
    }

    async fn reject_staged(&self, ctx: &mut Context, customer_id: UserId) -> EngineResult<()> {
        let session = ctx.session_of(self.sessions.as_ref(), customer_id);
        let Some(staged) = session.staged_order.take() else {
            ctx.reply(texts::ORDER_NOT_FOUND);
            return Ok(());
        };

        settlement::reject_order(self.store.as_ref(), &staged).await?;
        ctx.send(customer_id, texts::ORDER_REJECTED, None);
        ctx.reply(texts::ADMIN_ORDER_REJECTED);
        Ok(())
    }

    // ── Stored orders ──

    async fn decide_stored(
        &self,
        ctx: &mut Context,
        reference: OrderRef,
        confirm: bool,
    ) -> EngineResult<()> {
        let store = self.store.as_ref();
        let decision = if confirm {
            settlement::confirm_stored_order(store, reference).await?
        } else {
            settlement::reject_stored_order(store, reference).await?
        };

        match decision {
            StoredDecision::NotFound => ctx.reply(texts::ORDER_NOT_FOUND),
            StoredDecision::AlreadyProcessed(status) => {
                ctx.reply(texts::already_processed(status))
            }
            StoredDecision::Applied { record, balance } if confirm => {
                self.notify_stored_confirmed(ctx, &record, balance).await?;
                ctx.reply(texts::ADMIN_ORDER_CONFIRMED);
            }
            StoredDecision::Applied { record, .. } => {
                ctx.send(record.order.customer_id, texts::ORDER_REJECTED, None);
                ctx.reply(texts::ADMIN_ORDER_REJECTED);
            }
        }
        Ok(())
    }

    async fn notify_stored_confirmed(
        &self,
        ctx: &mut Context,
        record: &OrderRecord,
        balance: Option<rust_decimal::Decimal>,
    ) -> EngineResult<()> {
        let customer_id = record.order.customer_id;
        // Rows typed into the sheet may name an unknown customer
        let Some(customer) = self.store.find_customer(customer_id).await? else {
            warn!(customer_id, reference = record.reference, "Confirmed order of unknown customer");
            return Ok(());
        };
        ctx.send(
            customer_id,
            texts::order_confirmed(&record.order, customer.role, balance.unwrap_or(customer.bonus)),
            None,
        );
        Ok(())
    }

    // ── Bonus withdrawals ──

    async fn approve_bonus(&self, ctx: &mut Context, customer_id: UserId) -> EngineResult<()> {
        let session = ctx.session_of(self.sessions.as_ref(), customer_id);
        let Some(request) = session.pending_bonus.take() else {
            ctx.reply(texts::REQUEST_NOT_FOUND);
            return Ok(());
        };

        match settlement::withdraw_bonus(self.store.as_ref(), customer_id).await? {
            Some(withdrawn) => {
                if withdrawn != request.amount {
                    info!(customer_id, requested = %request.amount, %withdrawn, "Balance changed since the request");
                }
                ctx.send(customer_id, texts::bonus_approved(withdrawn), None);
                ctx.reply(texts::ADMIN_BONUS_APPROVED);
            }
            None => ctx.reply(texts::CUSTOMER_NOT_FOUND),
        }
        Ok(())
    }

    async fn reject_bonus(&self, ctx: &mut Context, customer_id: UserId) -> EngineResult<()> {
        let session = ctx.session_of(self.sessions.as_ref(), customer_id);
        if session.pending_bonus.take().is_none() {
            ctx.reply(texts::REQUEST_NOT_FOUND);
            return Ok(());
        }

        info!(customer_id, "Bonus withdrawal rejected");
        ctx.send(customer_id, texts::BONUS_REJECTED, None);
        ctx.reply(texts::ADMIN_BONUS_REJECTED);
        Ok(())
    }

    // ── Profile edits ──

    async fn approve_edit(&self, ctx: &mut Context, customer_id: UserId) -> EngineResult<()> {
        let session = ctx.session_of(self.sessions.as_ref(), customer_id);
        let Some(request) = session.pending_edit.take() else {
            ctx.reply(texts::REQUEST_NOT_FOUND);
            return Ok(());
        };
        let Some(mut customer) = self.store.find_customer(customer_id).await? else {
            ctx.reply(texts::CUSTOMER_NOT_FOUND);
            return Ok(());
        };

        customer.apply_profile(request.profile);
        self.store.upsert_customer(&customer).await?;

        info!(customer_id, role = %customer.role, "Profile edit approved");
        ctx.send(
            customer_id,
            texts::EDIT_APPROVED,
            Some(menu::customer_menu(customer.role)),
        );
        ctx.reply(texts::ADMIN_EDIT_APPROVED);
        Ok(())
    }

    async fn reject_edit(&self, ctx: &mut Context, customer_id: UserId) -> EngineResult<()> {
        let session = ctx.session_of(self.sessions.as_ref(), customer_id);
        if session.pending_edit.take().is_none() {
            ctx.reply(texts::REQUEST_NOT_FOUND);
            return Ok(());
        }

        info!(customer_id, "Profile edit rejected");
        ctx.send(customer_id, texts::EDIT_REJECTED, None);
        ctx.reply(texts::ADMIN_EDIT_REJECTED);
        Ok(())
    }
}
