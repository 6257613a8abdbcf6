//! 核心模块 - 配置与启动错误
//!
//! # 模块结构
//!
//! - [`Config`] - 机器人配置 (环境变量)
//! - [`ConfigError`] - 配置错误

pub mod config;
pub mod error;

pub use config::{Config, StoreBackend};
pub use error::ConfigError;
