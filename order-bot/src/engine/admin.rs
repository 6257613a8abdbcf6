//! Administrator track: groups, products, listings

use rust_decimal::Decimal;
use shared::models::{OrderStatus, Product};
use tracing::info;

use super::menu::{self, Command};
use super::token::Token;
use super::{Context, Engine, EngineError, EngineResult, texts};
use crate::session::{AdminStep, DialogueState, ProductPurpose};
use crate::utils::validation::{self, InputError};

/// Customers per listing message (Telegram caps a message at 4096 chars)
const CUSTOMERS_PER_MESSAGE: usize = 30;

fn step(step: AdminStep) -> DialogueState {
    DialogueState::Admin(step)
}

fn price_error(err: InputError) -> &'static str {
    match err {
        InputError::OutOfRange => texts::PRICE_NOT_POSITIVE,
        InputError::TooLarge { .. } => texts::PRICE_TOO_LARGE,
        _ => texts::PRICE_NOT_NUMBER,
    }
}

fn percent_error(err: InputError) -> &'static str {
    match err {
        InputError::OutOfRange => texts::PERCENT_OUT_OF_RANGE,
        _ => texts::PERCENT_NOT_NUMBER,
    }
}

fn stock_error(err: InputError) -> &'static str {
    match err {
        InputError::OutOfRange => texts::STOCK_NEGATIVE,
        _ => texts::QUANTITY_NOT_INTEGER,
    }
}

impl Engine {
    pub(super) async fn admin_command(&self, ctx: &mut Context, command: Command) -> EngineResult<()> {
        let (prompt, make): (&str, fn(String) -> Token) = match command {
            Command::AddGroup => {
                ctx.set_state(step(AdminStep::AwaitingGroupName));
                ctx.reply(texts::ENTER_GROUP_NAME);
                return Ok(());
            }
            Command::ListOrders => {
                ctx.set_state(step(AdminStep::AwaitingOrderDateFilter));
                ctx.reply(texts::ENTER_DATE);
                return Ok(());
            }
            Command::ListCustomers => return self.list_customers(ctx).await,
            Command::DeleteGroup => (texts::PICK_GROUP_TO_DELETE, Token::DeleteGroup),
            Command::AddProduct => (texts::PICK_GROUP_FOR_ADD, Token::AddProductIn),
            Command::EditProduct => (texts::PICK_GROUP_FOR_EDIT, Token::EditProductIn),
            Command::DeleteProduct => (
                texts::PICK_GROUP_FOR_PRODUCT_DELETE,
                Token::DeleteProductIn,
            ),
            Command::ListProducts => (texts::PICK_GROUP_FOR_LIST, Token::ListProductsIn),
            other => {
                return Err(EngineError::invariant(format!(
                    "{other:?} is not an admin command"
                )));
            }
        };

        // 以下命令都从选择分组开始
        let groups = self.store.list_groups().await?;
        if groups.is_empty() {
            ctx.reply(texts::NO_GROUPS_ADD_FIRST);
            return Ok(());
        }
        ctx.reply_with(prompt, menu::group_choices(&groups, make));
        Ok(())
    }

    async fn list_customers(&self, ctx: &mut Context) -> EngineResult<()> {
        let customers = self.store.list_customers().await?;
        if customers.is_empty() {
            ctx.reply(texts::NO_CUSTOMERS);
            return Ok(());
        }
        for chunk in customers.chunks(CUSTOMERS_PER_MESSAGE) {
            let lines: Vec<String> = chunk.iter().map(texts::customer_line).collect();
            ctx.reply(lines.join("\n"));
        }
        Ok(())
    }

    pub(super) async fn admin_button(&self, ctx: &mut Context, token: Token) -> EngineResult<()> {
        match token {
            Token::AddProductIn(group) => {
                if !self.store.list_groups().await?.contains(&group) {
                    ctx.reply(texts::GROUP_NOT_FOUND);
                    return Ok(());
                }
                ctx.reply(texts::enter_product_name(&group));
                ctx.set_state(step(AdminStep::AwaitingProductName { group }));
            }
            Token::EditProductIn(group) => {
                self.offer_products(ctx, group, ProductPurpose::Edit).await?
            }
            Token::DeleteProductIn(group) => {
                self.offer_products(ctx, group, ProductPurpose::Delete).await?
            }
            Token::ListProductsIn(group) => {
                let products = self.store.list_products(Some(&group)).await?;
                if products.is_empty() {
                    ctx.reply(texts::group_empty(&group));
                    return Ok(());
                }
                let lines: Vec<String> = products.iter().map(texts::product_line).collect();
                ctx.reply(format!("{}\n{}", texts::group_products(&group), lines.join("\n")));
            }
            Token::DeleteGroup(group) => {
                let products = self.store.list_products(Some(&group)).await?.len();
                if !self.store.delete_group(&group).await? {
                    ctx.reply(texts::GROUP_NOT_FOUND);
                    return Ok(());
                }
                info!(%group, products, "Group deleted");
                ctx.reply(texts::group_deleted(&group, products));
            }
            Token::PickProduct(name) => self.picked_product(ctx, name).await?,
            other => {
                return Err(EngineError::invariant(format!(
                    "{other} is not a catalog button"
                )));
            }
        }
        Ok(())
    }

    async fn offer_products(
        &self,
        ctx: &mut Context,
        group: String,
        purpose: ProductPurpose,
    ) -> EngineResult<()> {
        let products = self.store.list_products(Some(&group)).await?;
        if products.is_empty() {
            ctx.reply(texts::group_empty(&group));
            return Ok(());
        }
        ctx.reply_with(
            texts::pick_product(&group),
            menu::admin_product_choices(&products),
        );
        ctx.set_state(step(AdminStep::PickingProduct { group, purpose }));
        Ok(())
    }

    async fn picked_product(&self, ctx: &mut Context, name: String) -> EngineResult<()> {
        let DialogueState::Admin(AdminStep::PickingProduct { group, purpose }) =
            ctx.session.state.clone()
        else {
            return Err(EngineError::invariant("product picked outside a product list"));
        };
        ctx.set_state(DialogueState::Idle);

        let products = self.store.list_products(Some(&group)).await?;
        let Some(product) = products.into_iter().find(|p| p.is_keyed(&group, &name)) else {
            ctx.reply(texts::PRODUCT_MISSING);
            return Ok(());
        };

        match purpose {
            ProductPurpose::Edit => {
                ctx.reply(texts::edit_product_start(&product));
                ctx.set_state(step(AdminStep::AwaitingEditProductName { original: product }));
            }
            ProductPurpose::Delete => {
                if self.store.delete_product(&group, &name).await? {
                    info!(%group, product = %name, "Product deleted");
                    ctx.reply(texts::product_deleted(&group, &name));
                } else {
                    ctx.reply(texts::PRODUCT_MISSING);
                }
            }
        }
        Ok(())
    }

    async fn name_taken(&self, group: &str, name: &str) -> EngineResult<bool> {
        let products = self.store.list_products(Some(group)).await?;
        Ok(products.iter().any(|p| p.is_keyed(group, name)))
    }

    pub(super) async fn admin_text(
        &self,
        ctx: &mut Context,
        current: AdminStep,
        text: &str,
    ) -> EngineResult<()> {
        match current {
            AdminStep::AwaitingGroupName => {
                let Ok(name) = validation::catalog_name(text) else {
                    ctx.reply(texts::BAD_CATALOG_NAME);
                    return Ok(());
                };
                if !self.store.add_group(&name).await? {
                    ctx.reply(texts::GROUP_EXISTS);
                    return Ok(());
                }
                info!(group = %name, "Group added");
                ctx.set_state(DialogueState::Idle);
                ctx.reply_with(texts::group_added(&name), menu::admin_menu());
            }
            AdminStep::PickingProduct { .. } => ctx.reply(texts::CHOOSE_FROM_LIST),

            // ── Create product ──
            AdminStep::AwaitingProductName { group } => {
                let Ok(name) = validation::catalog_name(text) else {
                    ctx.reply(texts::BAD_CATALOG_NAME);
                    return Ok(());
                };
                if self.name_taken(&group, &name).await? {
                    ctx.reply(texts::PRODUCT_EXISTS);
                    return Ok(());
                }
                ctx.set_state(step(AdminStep::AwaitingProductPrice { group, name }));
                ctx.reply(texts::ENTER_PRICE);
            }
            AdminStep::AwaitingProductPrice { group, name } => match validation::price(text) {
                Ok(price) => {
                    ctx.set_state(step(AdminStep::AwaitingProductBonusPercent {
                        group,
                        name,
                        price,
                    }));
                    ctx.reply(texts::ENTER_BONUS_PERCENT);
                }
                Err(err) => ctx.reply(price_error(err)),
            },
            AdminStep::AwaitingProductBonusPercent { group, name, price } => {
                match validation::bonus_percent(text) {
                    Ok(bonus_percent) => {
                        ctx.set_state(step(AdminStep::AwaitingProductQuantity {
                            group,
                            name,
                            price,
                            bonus_percent,
                        }));
                        ctx.reply(texts::ENTER_STOCK);
                    }
                    Err(err) => ctx.reply(percent_error(err)),
                }
            }
            AdminStep::AwaitingProductQuantity {
                group,
                name,
                price,
                bonus_percent,
            } => {
                let quantity = match validation::stock_quantity(text) {
                    Ok(quantity) => quantity,
                    Err(err) => {
                        ctx.reply(stock_error(err));
                        return Ok(());
                    }
                };
                let product = Product {
                    group,
                    name,
                    price,
                    bonus_percent,
                    quantity,
                };
                self.store.upsert_product(&product).await?;
                info!(group = %product.group, product = %product.name, "Product added");
                ctx.set_state(DialogueState::Idle);
                ctx.reply_with(texts::product_added(&product), menu::admin_menu());
            }

            // ── Edit product ──
            AdminStep::AwaitingEditProductName { original } => {
                let Ok(name) = validation::catalog_name(text) else {
                    ctx.reply(texts::BAD_CATALOG_NAME);
                    return Ok(());
                };
                if name != original.name && self.name_taken(&original.group, &name).await? {
                    ctx.reply(texts::PRODUCT_EXISTS);
                    return Ok(());
                }
                ctx.reply(texts::edit_product_price(&name, original.price));
                ctx.set_state(step(AdminStep::AwaitingEditProductPrice { original, name }));
            }
            AdminStep::AwaitingEditProductPrice { original, name } => {
                match validation::price(text) {
                    Ok(price) => {
                        ctx.reply(texts::edit_product_bonus(price, original.bonus_percent));
                        ctx.set_state(step(AdminStep::AwaitingEditProductBonusPercent {
                            original,
                            name,
                            price,
                        }));
                    }
                    Err(err) => ctx.reply(price_error(err)),
                }
            }
            AdminStep::AwaitingEditProductBonusPercent {
                original,
                name,
                price,
            } => match validation::bonus_percent(text) {
                Ok(bonus_percent) => {
                    ctx.reply(texts::edit_product_stock(bonus_percent, original.quantity));
                    ctx.set_state(step(AdminStep::AwaitingEditProductQuantity {
                        original,
                        name,
                        price,
                        bonus_percent,
                    }));
                }
                Err(err) => ctx.reply(percent_error(err)),
            },
            AdminStep::AwaitingEditProductQuantity {
                original,
                name,
                price,
                bonus_percent,
            } => {
                let quantity = match validation::stock_quantity(text) {
                    Ok(quantity) => quantity,
                    Err(err) => {
                        ctx.reply(stock_error(err));
                        return Ok(());
                    }
                };
                let updated = Product {
                    group: original.group.clone(),
                    name,
                    price,
                    bonus_percent,
                    quantity,
                };
                self.finish_edit(ctx, original, updated).await?;
            }

            AdminStep::AwaitingOrderDateFilter => self.orders_on(ctx, text).await?,
        }
        Ok(())
    }

    async fn finish_edit(
        &self,
        ctx: &mut Context,
        original: Product,
        updated: Product,
    ) -> EngineResult<()> {
        ctx.set_state(DialogueState::Idle);
        if !self.name_taken(&original.group, &original.name).await? {
            ctx.reply_with(texts::PRODUCT_MISSING, menu::admin_menu());
            return Ok(());
        }

        // 1. Write the new values (a rename creates the new key)
        self.store.upsert_product(&updated).await?;

        // 2. Drop the old key after a rename
        if updated.name != original.name {
            self.store
                .delete_product(&original.group, &original.name)
                .await?;
        }

        info!(
            group = %updated.group,
            product = %updated.name,
            renamed_from = %original.name,
            "Product updated"
        );
        ctx.reply_with(texts::product_updated(&updated), menu::admin_menu());
        Ok(())
    }

    async fn orders_on(&self, ctx: &mut Context, text: &str) -> EngineResult<()> {
        let Ok(date) = validation::date(text) else {
            ctx.reply(texts::BAD_DATE);
            return Ok(());
        };
        ctx.set_state(DialogueState::Idle);

        let records: Vec<_> = self
            .store
            .list_orders(None)
            .await?
            .into_iter()
            .filter(|r| r.order.created_date() == date)
            .collect();
        if records.is_empty() {
            ctx.reply(texts::NO_ORDERS_ON_DATE);
            return Ok(());
        }

        let mut total = Decimal::ZERO;
        for record in &records {
            total += record.order.total_sum;
            let text = texts::stored_order(&record.order);
            if record.order.status == OrderStatus::Pending {
                ctx.reply_with(
                    text,
                    menu::decision(
                        Token::ConfirmStoredOrder(record.reference),
                        Token::RejectStoredOrder(record.reference),
                    ),
                );
            } else {
                ctx.reply(text);
            }
        }
        info!(%date, orders = records.len(), %total, "Orders listed");
        Ok(())
    }
}
