//! Inline button tokens
//!
//! Telegram limits callback data to 64 bytes, so prefixes are short and
//! catalog names are capped at 40 bytes. Product buttons carry only the
//! product name; the group comes from the dialogue state.

use shared::{OrderRef, UserId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Platform limit for callback data
pub const MAX_TOKEN_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // ── Customer ordering ──
    Group(String),
    Product(String),
    ConfirmCart,

    // ── Admin catalog pickers ──
    AddProductIn(String),
    EditProductIn(String),
    DeleteProductIn(String),
    ListProductsIn(String),
    DeleteGroup(String),
    PickProduct(String),

    // ── Admin decisions ──
    ConfirmOrder(UserId),
    RejectOrder(UserId),
    ConfirmStoredOrder(OrderRef),
    RejectStoredOrder(OrderRef),
    ApproveBonus(UserId),
    RejectBonus(UserId),
    ApproveEdit(UserId),
    RejectEdit(UserId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown button token: {0}")]
pub struct UnknownToken(pub String);

impl Token {
    /// Buttons only an administrator may press
    pub fn is_admin_only(&self) -> bool {
        !matches!(
            self,
            Token::Group(_) | Token::Product(_) | Token::ConfirmCart
        )
    }

    /// Encoded form, or `None` when it would not fit the platform limit
    pub fn encode(&self) -> Option<String> {
        let token = self.to_string();
        (token.len() <= MAX_TOKEN_LEN).then_some(token)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Group(g) => write!(f, "g:{g}"),
            Token::Product(p) => write!(f, "p:{p}"),
            Token::ConfirmCart => f.write_str("cart"),
            Token::AddProductIn(g) => write!(f, "ag:{g}"),
            Token::EditProductIn(g) => write!(f, "eg:{g}"),
            Token::DeleteProductIn(g) => write!(f, "dg:{g}"),
            Token::ListProductsIn(g) => write!(f, "lg:{g}"),
            Token::DeleteGroup(g) => write!(f, "xg:{g}"),
            Token::PickProduct(p) => write!(f, "pp:{p}"),
            Token::ConfirmOrder(id) => write!(f, "oc:{id}"),
            Token::RejectOrder(id) => write!(f, "or:{id}"),
            Token::ConfirmStoredOrder(row) => write!(f, "rc:{row}"),
            Token::RejectStoredOrder(row) => write!(f, "rr:{row}"),
            Token::ApproveBonus(id) => write!(f, "bc:{id}"),
            Token::RejectBonus(id) => write!(f, "br:{id}"),
            Token::ApproveEdit(id) => write!(f, "ec:{id}"),
            Token::RejectEdit(id) => write!(f, "er:{id}"),
        }
    }
}

impl FromStr for Token {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownToken(s.to_string());
        if s == "cart" {
            return Ok(Token::ConfirmCart);
        }

        let (prefix, arg) = s.split_once(':').ok_or_else(unknown)?;
        let name = || {
            if arg.is_empty() {
                Err(unknown())
            } else {
                Ok(arg.to_string())
            }
        };
        let user = || arg.parse::<UserId>().map_err(|_| unknown());
        let row = || arg.parse::<OrderRef>().map_err(|_| unknown());

        Ok(match prefix {
            "g" => Token::Group(name()?),
            "p" => Token::Product(name()?),
            "ag" => Token::AddProductIn(name()?),
            "eg" => Token::EditProductIn(name()?),
            "dg" => Token::DeleteProductIn(name()?),
            "lg" => Token::ListProductsIn(name()?),
            "xg" => Token::DeleteGroup(name()?),
            "pp" => Token::PickProduct(name()?),
            "oc" => Token::ConfirmOrder(user()?),
            "or" => Token::RejectOrder(user()?),
            "rc" => Token::ConfirmStoredOrder(row()?),
            "rr" => Token::RejectStoredOrder(row()?),
            "bc" => Token::ApproveBonus(user()?),
            "br" => Token::RejectBonus(user()?),
            "ec" => Token::ApproveEdit(user()?),
            "er" => Token::RejectEdit(user()?),
            _ => return Err(unknown()),
        })
    }
}
