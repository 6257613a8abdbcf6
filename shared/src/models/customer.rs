//! Customer Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Role;
use crate::types::UserId;

/// Customer entity (Haridor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Platform user id, unique across the sheet
    pub id: UserId,
    pub name: String,
    /// `+998XXXXXXXXX`
    pub phone: String,
    /// Free text or `Lat:{lat} Lon:{lon}`
    pub address: String,
    pub role: Role,
    /// Accrued bonus, never negative
    pub bonus: Decimal,
}

impl Customer {
    /// New customer as created by registration (bonus starts at zero)
    pub fn register(id: UserId, profile: Profile) -> Self {
        Self {
            id,
            name: profile.name,
            phone: profile.phone,
            address: profile.address,
            role: profile.role,
            bonus: Decimal::ZERO,
        }
    }

    pub fn profile(&self) -> Profile {
        Profile {
            name: self.name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            role: self.role,
        }
    }

    /// Replace the editable fields, keeping id and bonus
    pub fn apply_profile(&mut self, profile: Profile) {
        self.name = profile.name;
        self.phone = profile.phone;
        self.address = profile.address;
        self.role = profile.role;
    }
}

/// Editable part of a customer: what registration collects and what an
/// edit request proposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub role: Role,
}
