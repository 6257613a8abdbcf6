//! Order Bot - 建材店订货机器人
//!
//! # 架构概述
//!
//! 客户通过聊天注册、按分组选购商品并提交送货位置；管理员审批订单、
//! 奖励金提现和资料修改，并维护分组与商品。所有持久数据保存在
//! Google Sheets 中，会话状态只保存在内存里。
//!
//! # 模块结构
//!
//! ```text
//! order-bot/src/
//! ├── core/          # 配置、错误
//! ├── store/         # 记录存储 (Sheets / 内存 / 缓存)
//! ├── session/       # 每个用户的对话状态
//! ├── settlement/    # 购物车、订单结算、奖励金
//! ├── engine/        # 会话状态机 (核心)
//! ├── transport/     # Telegram 长轮询
//! └── utils/         # 日志、输入校验
//! ```

pub mod core;
pub mod engine;
pub mod session;
pub mod settlement;
pub mod store;
pub mod transport;
pub mod utils;

// Re-export 公共类型
pub use self::core::{Config, ConfigError, StoreBackend};
pub use engine::{Engine, EngineError};
pub use session::{MemorySessionStore, Session, SessionStore};
pub use store::{CachedStore, MemoryStore, RecordStore, SheetStore, StoreError};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;
