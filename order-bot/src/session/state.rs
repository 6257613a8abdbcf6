//! Dialogue states
//!
//! One enum per track. Each variant carries exactly the scratch data that
//! step needs, so a step can never run without its inputs.

use rust_decimal::Decimal;
use shared::models::Product;

/// Where a user is in their conversation
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogueState {
    /// Main menu
    #[default]
    Idle,
    Customer(CustomerStep),
    Admin(AdminStep),
}

impl DialogueState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DialogueState::Idle)
    }

    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::Customer(step) => step.name(),
            DialogueState::Admin(step) => step.name(),
        }
    }
}

/// Customer track
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerStep {
    // ── Registration ──
    AwaitingName,
    AwaitingPhone {
        name: String,
    },
    AwaitingLocation {
        name: String,
        phone: String,
    },
    AwaitingRole {
        name: String,
        phone: String,
        address: String,
    },

    // ── Profile edit ──
    AwaitingEditName,
    AwaitingEditPhone {
        name: String,
    },
    AwaitingEditLocation {
        name: String,
        phone: String,
    },
    AwaitingEditRole {
        name: String,
        phone: String,
        address: String,
    },

    // ── Ordering ──
    AwaitingGroupSelection,
    AwaitingProductSelection {
        group: String,
    },
    AwaitingQuantity {
        group: String,
        product: String,
    },
    AwaitingOrderLocation,
}

impl CustomerStep {
    pub fn name(&self) -> &'static str {
        match self {
            CustomerStep::AwaitingName => "awaiting_name",
            CustomerStep::AwaitingPhone { .. } => "awaiting_phone",
            CustomerStep::AwaitingLocation { .. } => "awaiting_location",
            CustomerStep::AwaitingRole { .. } => "awaiting_role",
            CustomerStep::AwaitingEditName => "awaiting_edit_name",
            CustomerStep::AwaitingEditPhone { .. } => "awaiting_edit_phone",
            CustomerStep::AwaitingEditLocation { .. } => "awaiting_edit_location",
            CustomerStep::AwaitingEditRole { .. } => "awaiting_edit_role",
            CustomerStep::AwaitingGroupSelection => "awaiting_group_selection",
            CustomerStep::AwaitingProductSelection { .. } => "awaiting_product_selection",
            CustomerStep::AwaitingQuantity { .. } => "awaiting_quantity",
            CustomerStep::AwaitingOrderLocation => "awaiting_order_location",
        }
    }
}

/// What an admin's product pick is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductPurpose {
    Edit,
    Delete,
}

/// Administrator track
#[derive(Debug, Clone, PartialEq)]
pub enum AdminStep {
    AwaitingGroupName,

    /// Product buttons of `group` are on screen
    PickingProduct {
        group: String,
        purpose: ProductPurpose,
    },

    // ── Create product ──
    AwaitingProductName {
        group: String,
    },
    AwaitingProductPrice {
        group: String,
        name: String,
    },
    AwaitingProductBonusPercent {
        group: String,
        name: String,
        price: Decimal,
    },
    AwaitingProductQuantity {
        group: String,
        name: String,
        price: Decimal,
        bonus_percent: Decimal,
    },

    // ── Edit product (each prompt shows the current value) ──
    AwaitingEditProductName {
        original: Product,
    },
    AwaitingEditProductPrice {
        original: Product,
        name: String,
    },
    AwaitingEditProductBonusPercent {
        original: Product,
        name: String,
        price: Decimal,
    },
    AwaitingEditProductQuantity {
        original: Product,
        name: String,
        price: Decimal,
        bonus_percent: Decimal,
    },

    AwaitingOrderDateFilter,
}

impl AdminStep {
    pub fn name(&self) -> &'static str {
        match self {
            AdminStep::AwaitingGroupName => "awaiting_group_name",
            AdminStep::PickingProduct { .. } => "picking_product",
            AdminStep::AwaitingProductName { .. } => "awaiting_product_name",
            AdminStep::AwaitingProductPrice { .. } => "awaiting_product_price",
            AdminStep::AwaitingProductBonusPercent { .. } => "awaiting_product_bonus_percent",
            AdminStep::AwaitingProductQuantity { .. } => "awaiting_product_quantity",
            AdminStep::AwaitingEditProductName { .. } => "awaiting_edit_product_name",
            AdminStep::AwaitingEditProductPrice { .. } => "awaiting_edit_product_price",
            AdminStep::AwaitingEditProductBonusPercent { .. } => {
                "awaiting_edit_product_bonus_percent"
            }
            AdminStep::AwaitingEditProductQuantity { .. } => "awaiting_edit_product_quantity",
            AdminStep::AwaitingOrderDateFilter => "awaiting_order_date_filter",
        }
    }
}
