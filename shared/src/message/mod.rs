//! 聊天消息类型定义
//!
//! 传输层 (Telegram) 与会话引擎之间的契约：传输层把平台更新转换为
//! [`Inbound`]，引擎返回若干 [`Outbound`]，由传输层负责投递。
//! 引擎从不直接调用传输层。

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// 入站事件 - 一次用户操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inbound {
    /// 文本消息 (包括菜单按钮文本和 `/start` 等命令)
    Text { user_id: UserId, text: String },
    /// 地理位置消息
    Location { user_id: UserId, lat: f64, lon: f64 },
    /// 内联按钮回调
    Button { user_id: UserId, token: String },
}

impl Inbound {
    pub fn user_id(&self) -> UserId {
        match self {
            Inbound::Text { user_id, .. }
            | Inbound::Location { user_id, .. }
            | Inbound::Button { user_id, .. } => *user_id,
        }
    }

    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::Text { .. } => "text",
            Inbound::Location { .. } => "location",
            Inbound::Button { .. } => "button",
        }
    }
}

/// 内联按钮: 显示文本 + 回调令牌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// 附加在出站消息上的键盘
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyboard {
    /// 常驻菜单 (按行排列的按钮文本，点击即发送文本)
    Menu(Vec<Vec<String>>),
    /// 内联选项 (按行排列，点击产生回调)
    Inline(Vec<Vec<Button>>),
    /// 单个"发送位置"按钮
    RequestLocation(String),
    /// 移除常驻菜单
    Remove,
}

/// 出站消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    pub recipient: UserId,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Outbound {
    pub fn text(recipient: UserId, text: impl Into<String>) -> Self {
        Self {
            recipient,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Inline choice tokens carried by this message, in display order
    pub fn tokens(&self) -> Vec<&str> {
        match &self.keyboard {
            Some(Keyboard::Inline(rows)) => rows
                .iter()
                .flatten()
                .map(|button| button.token.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_user_id_and_kind() {
        let msg = Inbound::Location {
            user_id: 42,
            lat: 41.3,
            lon: 69.2,
        };
        assert_eq!(msg.user_id(), 42);
        assert_eq!(msg.kind(), "location");
    }

    #[test]
    fn test_outbound_tokens_flatten_rows() {
        let msg = Outbound::text(1, "pick").with_keyboard(Keyboard::Inline(vec![
            vec![Button::new("A", "a")],
            vec![Button::new("B", "b"), Button::new("C", "c")],
        ]));
        assert_eq!(msg.tokens(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_outbound_without_inline_has_no_tokens() {
        let msg = Outbound::text(1, "menu")
            .with_keyboard(Keyboard::Menu(vec![vec!["x".to_string()]]));
        assert!(msg.tokens().is_empty());
    }
}
