//! 会话模块 - 每个用户的对话状态
//!
//! # 模块结构
//!
//! - [`Session`] - 对话状态 + 购物车 + 待审批请求
//! - [`SessionStore`] - 会话存储接口 (注入到引擎)
//! - [`MemorySessionStore`] - DashMap 实现，重启即丢失

pub mod memory;
pub mod state;

pub use memory::MemorySessionStore;
pub use state::{AdminStep, CustomerStep, DialogueState, ProductPurpose};

use rust_decimal::Decimal;
use shared::UserId;
use shared::models::Profile;

use crate::settlement::{Cart, StagedOrder};

/// Bonus payout waiting for an admin
#[derive(Debug, Clone, PartialEq)]
pub struct BonusWithdrawalRequest {
    pub amount: Decimal,
}

/// Profile change waiting for an admin; the stored record stays untouched
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub profile: Profile,
}

/// Everything the bot remembers about one user between messages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub state: DialogueState,
    pub cart: Option<Cart>,
    pub pending_bonus: Option<BonusWithdrawalRequest>,
    pub pending_edit: Option<EditRequest>,
    pub staged_order: Option<StagedOrder>,
}

impl Session {
    /// Idle with nothing pending: not worth keeping
    pub fn is_vacant(&self) -> bool {
        self.state.is_idle()
            && self.cart.is_none()
            && self.pending_bonus.is_none()
            && self.pending_edit.is_none()
            && self.staged_order.is_none()
    }

    /// Abandon the in-flight dialogue and cart; requests awaiting an
    /// admin survive
    pub fn reset_dialogue(&mut self) {
        self.state = DialogueState::Idle;
        self.cart = None;
    }
}

/// Session storage, keyed by user id
pub trait SessionStore: Send + Sync {
    fn get(&self, user_id: UserId) -> Option<Session>;

    fn set(&self, user_id: UserId, session: Session);

    fn delete(&self, user_id: UserId);

    /// Store `session`, or drop the entry when it is vacant
    fn put(&self, user_id: UserId, session: Session) {
        if session.is_vacant() {
            self.delete(user_id);
        } else {
            self.set(user_id, session);
        }
    }

    /// The stored session or a fresh idle one
    fn load(&self, user_id: UserId) -> Session {
        self.get(user_id).unwrap_or_default()
    }
}
