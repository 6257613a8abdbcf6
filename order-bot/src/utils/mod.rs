//! 工具模块 - 通用工具函数
//!
//! # 内容
//!
//! - [`logger`] - 日志初始化
//! - [`validation`] - 用户输入校验

pub mod logger;
pub mod validation;
