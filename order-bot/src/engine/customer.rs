//! Customer track: registration, profile edit, ordering, bonus

use chrono::Local;
use rust_decimal::Decimal;
use shared::models::{Customer, Profile, Role};
use shared::Keyboard;
use tracing::{info, warn};

use super::menu::{self, Command};
use super::token::Token;
use super::{Context, Engine, EngineError, EngineResult, texts};
use crate::session::{BonusWithdrawalRequest, CustomerStep, DialogueState, EditRequest};
use crate::settlement::{self, Cart, CartItem};
use crate::utils::validation::{self, InputError};

fn step(step: CustomerStep) -> DialogueState {
    DialogueState::Customer(step)
}

impl Engine {
    /// The caller's customer record; asks to register when there is none
    async fn registered(&self, ctx: &mut Context) -> EngineResult<Option<Customer>> {
        let customer = self.store.find_customer(ctx.user_id).await?;
        if customer.is_none() {
            ctx.set_state(DialogueState::Idle);
            ctx.reply_with(texts::PLEASE_REGISTER, menu::unregistered_menu());
        }
        Ok(customer)
    }

    pub(super) async fn customer_command(
        &self,
        ctx: &mut Context,
        command: Command,
    ) -> EngineResult<()> {
        if command == Command::SaveData {
            match self.store.find_customer(ctx.user_id).await? {
                Some(customer) => ctx.reply_with(
                    texts::welcome(&customer.name),
                    menu::customer_menu(customer.role),
                ),
                None => {
                    ctx.set_state(step(CustomerStep::AwaitingName));
                    ctx.reply_with(texts::ENTER_NAME, Keyboard::Remove);
                }
            }
            return Ok(());
        }

        let Some(customer) = self.registered(ctx).await? else {
            return Ok(());
        };

        match command {
            Command::EditProfile => {
                ctx.set_state(step(CustomerStep::AwaitingEditName));
                ctx.reply_with(texts::enter_new_name(&customer.name), Keyboard::Remove);
            }
            Command::OrderProduct => {
                let groups = self.store.list_groups().await?;
                if groups.is_empty() {
                    ctx.reply(texts::NO_GROUPS);
                    return Ok(());
                }
                ctx.session.cart = None;
                ctx.set_state(step(CustomerStep::AwaitingGroupSelection));
                ctx.reply_with(
                    texts::CHOOSE_GROUP,
                    menu::group_choices(&groups, Token::Group),
                );
            }
            Command::MyOrders => self.my_orders(ctx).await?,
            Command::TotalBonus if customer.role.earns_bonus() => {
                ctx.reply(texts::total_bonus(customer.bonus));
            }
            Command::WithdrawBonus if customer.role.earns_bonus() => {
                self.request_withdrawal(ctx, &customer)
            }
            Command::ContactAdmin => match self.admins.first() {
                Some(admin) => ctx.reply(texts::contact_admin(*admin)),
                None => ctx.reply(texts::GENERIC_ERROR),
            },
            _ => ctx.reply(texts::CHOOSE_FROM_MENU),
        }
        Ok(())
    }

    async fn my_orders(&self, ctx: &mut Context) -> EngineResult<()> {
        let mut orders: Vec<_> = self
            .store
            .list_orders(Some(ctx.user_id))
            .await?
            .into_iter()
            .map(|record| record.order)
            .collect();
        if let Some(staged) = &ctx.session.staged_order {
            orders.push(staged.order.clone());
        }

        if orders.is_empty() {
            ctx.reply(texts::NO_ORDERS);
            return Ok(());
        }
        for order in &orders {
            ctx.reply(texts::order_history_entry(order));
        }
        Ok(())
    }

    fn request_withdrawal(&self, ctx: &mut Context, customer: &Customer) {
        if customer.bonus <= Decimal::ZERO {
            ctx.reply(texts::NO_BONUS);
            return;
        }

        let amount = customer.bonus;
        if ctx.session.pending_bonus.is_some() {
            warn!(customer_id = customer.id, "Replacing undecided bonus request");
        }
        ctx.session.pending_bonus = Some(BonusWithdrawalRequest { amount });
        self.notify_admins(
            ctx,
            &texts::bonus_request(customer, amount),
            menu::decision(
                Token::ApproveBonus(customer.id),
                Token::RejectBonus(customer.id),
            ),
        );
        info!(customer_id = customer.id, %amount, "Bonus withdrawal requested");
        ctx.reply(texts::BONUS_REQUEST_SENT);
    }

    pub(super) async fn customer_text(
        &self,
        ctx: &mut Context,
        current: CustomerStep,
        text: &str,
    ) -> EngineResult<()> {
        match current {
            // ── Registration / edit: name and phone ──
            CustomerStep::AwaitingName | CustomerStep::AwaitingEditName => {
                let name = match validation::customer_name(text) {
                    Ok(name) => name,
                    Err(InputError::TooLong { .. }) => {
                        ctx.reply(texts::NAME_TOO_LONG);
                        return Ok(());
                    }
                    Err(_) => {
                        ctx.reply(texts::NAME_EMPTY);
                        return Ok(());
                    }
                };
                let next = if current == CustomerStep::AwaitingName {
                    CustomerStep::AwaitingPhone { name }
                } else {
                    CustomerStep::AwaitingEditPhone { name }
                };
                ctx.set_state(step(next));
                ctx.reply(texts::ENTER_PHONE);
            }
            CustomerStep::AwaitingPhone { name } => match validation::phone(text) {
                Ok(phone) => {
                    ctx.set_state(step(CustomerStep::AwaitingLocation { name, phone }));
                    ctx.reply_with(texts::SEND_LOCATION, menu::location_request());
                }
                Err(_) => ctx.reply(texts::BAD_PHONE),
            },
            CustomerStep::AwaitingEditPhone { name } => match validation::phone(text) {
                Ok(phone) => {
                    ctx.set_state(step(CustomerStep::AwaitingEditLocation { name, phone }));
                    ctx.reply_with(texts::SEND_LOCATION, menu::location_request());
                }
                Err(_) => ctx.reply(texts::BAD_PHONE),
            },
            CustomerStep::AwaitingLocation { .. } | CustomerStep::AwaitingEditLocation { .. } => {
                ctx.reply_with(texts::SEND_LOCATION_AGAIN, menu::location_request());
            }

            // ── Registration / edit: role ──
            CustomerStep::AwaitingRole {
                name,
                phone,
                address,
            } => {
                let Ok(role) = text.parse::<Role>() else {
                    ctx.reply_with(texts::BAD_ROLE, menu::roles_menu());
                    return Ok(());
                };
                self.register(ctx, Profile {
                    name,
                    phone,
                    address,
                    role,
                })
                .await?;
            }
            CustomerStep::AwaitingEditRole {
                name,
                phone,
                address,
            } => {
                let Ok(role) = text.parse::<Role>() else {
                    ctx.reply_with(texts::BAD_ROLE, menu::roles_menu());
                    return Ok(());
                };
                self.request_edit(ctx, Profile {
                    name,
                    phone,
                    address,
                    role,
                })
                .await?;
            }

            // ── Ordering ──
            CustomerStep::AwaitingGroupSelection | CustomerStep::AwaitingProductSelection { .. } => {
                ctx.reply(texts::CHOOSE_FROM_LIST);
            }
            CustomerStep::AwaitingQuantity { group, product } => {
                let quantity = match validation::order_quantity(text) {
                    Ok(quantity) => quantity,
                    Err(InputError::OutOfRange) => {
                        ctx.reply(texts::QUANTITY_NOT_POSITIVE);
                        return Ok(());
                    }
                    Err(InputError::TooLarge { .. }) => {
                        ctx.reply(texts::QUANTITY_TOO_LARGE);
                        return Ok(());
                    }
                    Err(_) => {
                        ctx.reply(texts::QUANTITY_NOT_INTEGER);
                        return Ok(());
                    }
                };
                self.add_to_cart(ctx, group, product, quantity).await?;
            }
            CustomerStep::AwaitingOrderLocation => {
                ctx.reply_with(texts::SEND_ORDER_LOCATION_AGAIN, menu::location_request());
            }
        }
        Ok(())
    }

    async fn register(&self, ctx: &mut Context, profile: Profile) -> EngineResult<()> {
        let customer = Customer::register(ctx.user_id, profile);
        // 注册时已有记录则不覆盖 (保留奖励余额)
        if self.store.find_customer(ctx.user_id).await?.is_some() {
            return Err(EngineError::invariant("registration for an existing customer"));
        }
        self.store.upsert_customer(&customer).await?;

        info!(customer_id = customer.id, role = %customer.role, "Customer registered");
        ctx.set_state(DialogueState::Idle);
        ctx.reply_with(texts::REGISTERED, menu::customer_menu(customer.role));
        Ok(())
    }

    /// Stage the proposed profile; the stored record is left alone
    async fn request_edit(&self, ctx: &mut Context, profile: Profile) -> EngineResult<()> {
        let Some(customer) = self.registered(ctx).await? else {
            return Ok(());
        };

        self.notify_admins(
            ctx,
            &texts::edit_request(&customer, &profile),
            menu::decision(
                Token::ApproveEdit(customer.id),
                Token::RejectEdit(customer.id),
            ),
        );
        ctx.session.pending_edit = Some(EditRequest { profile });

        info!(customer_id = customer.id, "Profile edit requested");
        ctx.set_state(DialogueState::Idle);
        ctx.reply_with(texts::EDIT_SENT, menu::customer_menu(customer.role));
        Ok(())
    }

    async fn add_to_cart(
        &self,
        ctx: &mut Context,
        group: String,
        product: String,
        quantity: u32,
    ) -> EngineResult<()> {
        let products = self.store.list_products(Some(&group)).await?;
        let Some(found) = products.iter().find(|p| p.name == product) else {
            ctx.set_state(step(CustomerStep::AwaitingProductSelection { group }));
            ctx.reply_with(texts::PRODUCT_NOT_FOUND, menu::product_choices(&products));
            return Ok(());
        };

        let Some(cart) = ctx.session.cart.as_mut().filter(|c| c.group == group) else {
            return Err(EngineError::invariant("quantity entered without a cart"));
        };
        let item = CartItem {
            product: found.name.clone(),
            quantity,
            unit_price: found.price,
            bonus_percent: found.bonus_percent,
        };
        if let Err(err) = cart.add(item) {
            warn!(%product, quantity, price = %found.price, error = %err, "Cart line refused");
            ctx.set_state(step(CustomerStep::AwaitingQuantity { group, product }));
            ctx.reply(texts::CART_TOO_LARGE);
            return Ok(());
        }

        ctx.set_state(step(CustomerStep::AwaitingProductSelection { group }));
        ctx.reply_with(
            texts::added_to_cart(&product, quantity),
            menu::product_choices(&products),
        );
        Ok(())
    }

    pub(super) async fn customer_location(
        &self,
        ctx: &mut Context,
        current: CustomerStep,
        lat: f64,
        lon: f64,
    ) -> EngineResult<()> {
        let address = texts::location_address(lat, lon);
        match current {
            CustomerStep::AwaitingLocation { name, phone } => {
                ctx.set_state(step(CustomerStep::AwaitingRole {
                    name,
                    phone,
                    address,
                }));
                ctx.reply_with(texts::CHOOSE_ROLE, menu::roles_menu());
            }
            CustomerStep::AwaitingEditLocation { name, phone } => {
                ctx.set_state(step(CustomerStep::AwaitingEditRole {
                    name,
                    phone,
                    address,
                }));
                ctx.reply_with(texts::CHOOSE_ROLE, menu::roles_menu());
            }
            CustomerStep::AwaitingOrderLocation => self.place_order(ctx, &address).await?,
            _ => ctx.reply(texts::CHOOSE_FROM_MENU),
        }
        Ok(())
    }

    /// Price the cart and hand it to the administrators
    async fn place_order(&self, ctx: &mut Context, address: &str) -> EngineResult<()> {
        let Some(customer) = self.registered(ctx).await? else {
            return Ok(());
        };
        let Some(cart) = ctx.session.cart.take().filter(|c| !c.is_empty()) else {
            return Err(EngineError::invariant("order location without a cart"));
        };

        let staged =
            settlement::stage_order(&customer, &cart, address, Local::now().naive_local());
        if let Some(previous) = &ctx.session.staged_order {
            warn!(
                customer_id = customer.id,
                replaced = %previous.id,
                stage_id = %staged.id,
                "Undecided order replaced by a new one"
            );
        }

        self.notify_admins(
            ctx,
            &texts::new_order(&staged.order, customer.role),
            menu::decision(
                Token::ConfirmOrder(customer.id),
                Token::RejectOrder(customer.id),
            ),
        );
        info!(
            customer_id = customer.id,
            stage_id = %staged.id,
            total = %staged.order.total_sum,
            bonus = %staged.bonus(),
            "Order staged"
        );
        ctx.session.staged_order = Some(staged);

        ctx.set_state(DialogueState::Idle);
        ctx.reply_with(texts::ORDER_SENT, menu::customer_menu(customer.role));
        Ok(())
    }

    pub(super) async fn customer_button(&self, ctx: &mut Context, token: Token) -> EngineResult<()> {
        let DialogueState::Customer(current) = ctx.session.state.clone() else {
            return Err(EngineError::invariant(format!("{token} pressed outside ordering")));
        };
        let selecting_group = match &current {
            CustomerStep::AwaitingGroupSelection => None,
            CustomerStep::AwaitingProductSelection { group }
            | CustomerStep::AwaitingQuantity { group, .. } => Some(group.clone()),
            _ => {
                return Err(EngineError::invariant(format!(
                    "{token} pressed in step {}",
                    current.name()
                )));
            }
        };

        match token {
            Token::Group(group) => {
                let products = self.store.list_products(Some(&group)).await?;
                if products.is_empty() {
                    ctx.reply(texts::group_empty(&group));
                    return Ok(());
                }
                // 每个订单只属于一个分组
                if ctx.session.cart.as_ref().is_none_or(|c| c.group != group) {
                    ctx.session.cart = Some(Cart::new(group.clone()));
                }
                ctx.set_state(step(CustomerStep::AwaitingProductSelection {
                    group: group.clone(),
                }));
                ctx.reply_with(texts::group_products(&group), menu::product_choices(&products));
            }
            Token::Product(product) => {
                let Some(group) = selecting_group else {
                    return Err(EngineError::invariant("product pressed before a group"));
                };
                let products = self.store.list_products(Some(&group)).await?;
                if !products.iter().any(|p| p.name == product) {
                    ctx.set_state(step(CustomerStep::AwaitingProductSelection { group }));
                    ctx.reply_with(texts::PRODUCT_NOT_FOUND, menu::product_choices(&products));
                    return Ok(());
                }
                ctx.reply(texts::enter_quantity(&product));
                ctx.set_state(step(CustomerStep::AwaitingQuantity { group, product }));
            }
            Token::ConfirmCart => {
                if ctx.session.cart.as_ref().is_none_or(Cart::is_empty) {
                    ctx.reply(texts::CART_EMPTY);
                    return Ok(());
                }
                ctx.set_state(step(CustomerStep::AwaitingOrderLocation));
                ctx.reply_with(texts::SEND_ORDER_LOCATION, menu::location_request());
            }
            other => return Err(EngineError::invariant(format!("{other} is not a customer button"))),
        }
        Ok(())
    }
}
