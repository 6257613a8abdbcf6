//! Reply-keyboard menus and the commands behind their labels

use shared::models::{Product, Role};
use shared::{Button, Keyboard};
use tracing::warn;

use super::texts;
use super::token::Token;

// ── Customer labels ──

pub const SAVE_DATA: &str = "Ma'lumotlaringizni saqlang";
pub const EDIT_PROFILE: &str = "Shaxsiy ma'lumotlarni o'zgartirish";
pub const ORDER_PRODUCT: &str = "Mahsulot buyurtma qilish";
pub const MY_ORDERS: &str = "Mening buyurtmalarim";
pub const TOTAL_BONUS: &str = "Umumiy Bonus";
pub const WITHDRAW_BONUS: &str = "Bonusni yechish";
pub const CONTACT_ADMIN: &str = "Admin bilan bog'lanish";

// ── Admin labels ──

pub const ADD_GROUP: &str = "Yangi guruh qo'shish";
pub const DELETE_GROUP: &str = "Guruhni o'chirish";
pub const ADD_PRODUCT: &str = "Mahsulot qo'shish";
pub const EDIT_PRODUCT: &str = "Mahsulotlar ma'lumotlarini o'zgartirish";
pub const DELETE_PRODUCT: &str = "Mahsulotni o'chirish";
pub const LIST_PRODUCTS: &str = "Mahsulot ro'yxati";
pub const LIST_ORDERS: &str = "Buyurtmalar ro'yxati";
pub const LIST_CUSTOMERS: &str = "Haridorlar ro'yxati";

/// Text commands available in every state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Id,
    // customer
    SaveData,
    EditProfile,
    OrderProduct,
    MyOrders,
    TotalBonus,
    WithdrawBonus,
    ContactAdmin,
    // admin
    AddGroup,
    DeleteGroup,
    AddProduct,
    EditProduct,
    DeleteProduct,
    ListProducts,
    ListOrders,
    ListCustomers,
}

impl Command {
    /// Match a text message against commands and menu labels
    pub fn parse(text: &str) -> Option<Self> {
        let command = match text.trim() {
            "/start" => Command::Start,
            "/id" => Command::Id,
            SAVE_DATA => Command::SaveData,
            EDIT_PROFILE => Command::EditProfile,
            ORDER_PRODUCT => Command::OrderProduct,
            MY_ORDERS => Command::MyOrders,
            TOTAL_BONUS => Command::TotalBonus,
            WITHDRAW_BONUS => Command::WithdrawBonus,
            CONTACT_ADMIN => Command::ContactAdmin,
            ADD_GROUP => Command::AddGroup,
            DELETE_GROUP => Command::DeleteGroup,
            ADD_PRODUCT => Command::AddProduct,
            EDIT_PRODUCT => Command::EditProduct,
            DELETE_PRODUCT => Command::DeleteProduct,
            LIST_PRODUCTS => Command::ListProducts,
            LIST_ORDERS => Command::ListOrders,
            LIST_CUSTOMERS => Command::ListCustomers,
            _ => return None,
        };
        Some(command)
    }

    pub fn is_admin_command(self) -> bool {
        matches!(
            self,
            Command::AddGroup
                | Command::DeleteGroup
                | Command::AddProduct
                | Command::EditProduct
                | Command::DeleteProduct
                | Command::ListProducts
                | Command::ListOrders
                | Command::ListCustomers
        )
    }
}

fn rows(labels: Vec<Vec<&str>>) -> Keyboard {
    Keyboard::Menu(
        labels
            .into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect(),
    )
}

pub fn unregistered_menu() -> Keyboard {
    rows(vec![vec![SAVE_DATA]])
}

/// Customer menu; bonus entries only for bonus-earning roles
pub fn customer_menu(role: Role) -> Keyboard {
    let mut labels = vec![vec![EDIT_PROFILE, ORDER_PRODUCT], vec![MY_ORDERS]];
    if role.earns_bonus() {
        labels.push(vec![TOTAL_BONUS, WITHDRAW_BONUS]);
    }
    labels.push(vec![CONTACT_ADMIN]);
    rows(labels)
}

pub fn admin_menu() -> Keyboard {
    rows(vec![
        vec![ADD_GROUP, DELETE_GROUP],
        vec![ADD_PRODUCT, EDIT_PRODUCT],
        vec![DELETE_PRODUCT, LIST_PRODUCTS],
        vec![LIST_ORDERS, LIST_CUSTOMERS],
    ])
}

pub fn roles_menu() -> Keyboard {
    Keyboard::Menu(
        Role::ALL
            .iter()
            .map(|role| vec![role.label().to_string()])
            .collect(),
    )
}

pub fn location_request() -> Keyboard {
    Keyboard::RequestLocation(texts::LOCATION_BUTTON.to_string())
}

// ── Inline choices ──

/// One button per row; buttons whose token would exceed the platform
/// limit are left out
pub fn inline<I>(choices: I) -> Keyboard
where
    I: IntoIterator<Item = (String, Token)>,
{
    Keyboard::Inline(
        choices
            .into_iter()
            .filter_map(|(label, token)| match token.encode() {
                Some(encoded) => Some(vec![Button::new(label, encoded)]),
                None => {
                    warn!(%token, "Button token too long, skipped");
                    None
                }
            })
            .collect(),
    )
}

/// Groups, each wrapped in the token `make` builds
pub fn group_choices(groups: &[String], make: fn(String) -> Token) -> Keyboard {
    inline(groups.iter().map(|g| (g.clone(), make(g.clone()))))
}

/// Customer's product list, followed by the confirm-cart button
pub fn product_choices(products: &[Product]) -> Keyboard {
    inline(
        products
            .iter()
            .map(|p| (texts::product_button(p), Token::Product(p.name.clone())))
            .chain([(texts::CONFIRM_CART_BUTTON.to_string(), Token::ConfirmCart)]),
    )
}

/// Admin's product picker
pub fn admin_product_choices(products: &[Product]) -> Keyboard {
    inline(
        products
            .iter()
            .map(|p| (texts::product_button(p), Token::PickProduct(p.name.clone()))),
    )
}

/// Approve / reject pair on one row
pub fn decision(approve: Token, reject: Token) -> Keyboard {
    let buttons = [
        (texts::APPROVE_BUTTON, approve),
        (texts::REJECT_BUTTON, reject),
    ]
    .into_iter()
    .filter_map(|(label, token)| token.encode().map(|t| Button::new(label, t)))
    .collect();
    Keyboard::Inline(vec![buttons])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_labels_parse_as_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse(" Umumiy Bonus "), Some(Command::TotalBonus));
        assert_eq!(Command::parse(LIST_CUSTOMERS), Some(Command::ListCustomers));
        assert_eq!(Command::parse("Aziz"), None);
    }

    #[test]
    fn test_bonus_entries_only_for_contractors() {
        let has_bonus = |kb: Keyboard| match kb {
            Keyboard::Menu(rows) => rows.iter().flatten().any(|l| l == TOTAL_BONUS),
            _ => false,
        };
        assert!(has_bonus(customer_menu(Role::Contractor)));
        assert!(!has_bonus(customer_menu(Role::Homeowner)));
    }

    #[test]
    fn test_product_choices_end_with_confirm_cart() {
        let products = vec![Product {
            group: "G".to_string(),
            name: "Cement".to_string(),
            price: rust_decimal::Decimal::new(50000, 0),
            bonus_percent: rust_decimal::Decimal::TEN,
            quantity: 5,
        }];
        let Keyboard::Inline(rows) = product_choices(&products) else {
            panic!("expected inline keyboard");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].label, "Cement (50 000 so'm)");
        assert_eq!(rows[0][0].token, "p:Cement");
        assert_eq!(rows[1][0].token, "cart");
    }
}
