//! Customer Role Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 客户身份 (Faoliyat turi)
///
/// 显示文本同时也是用户可输入的值，因此序列化也使用显示文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Do'kon egasi")]
    ShopOwner,
    #[serde(rename = "Qurilish kompaniyasi")]
    ConstructionCompany,
    #[serde(rename = "Uy egasi")]
    Homeowner,
    /// 唯一可以累计奖励金的身份
    #[serde(rename = "Usta")]
    Contractor,
}

impl Role {
    /// All roles in menu order
    pub const ALL: [Role; 4] = [
        Role::ShopOwner,
        Role::ConstructionCompany,
        Role::Homeowner,
        Role::Contractor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Role::ShopOwner => "Do'kon egasi",
            Role::ConstructionCompany => "Qurilish kompaniyasi",
            Role::Homeowner => "Uy egasi",
            Role::Contractor => "Usta",
        }
    }

    pub fn earns_bonus(self) -> bool {
        self == Role::Contractor
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a text is not one of the role labels
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.label() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
