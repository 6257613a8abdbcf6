use shared::UserId;
use std::collections::BTreeSet;
use std::time::Duration;

use super::ConfigError;

/// 数据存储后端
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Sheets (生产)
    Sheets {
        spreadsheet_id: String,
        /// 服务账号 JSON 密钥内容
        credentials_json: String,
    },
    /// 进程内存储 (本地调试，重启即丢失)
    Memory,
}

/// 机器人配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | BOT_TOKEN | 必填 | Telegram 机器人令牌 |
/// | ADMIN_IDS | 必填 | 管理员 ID，逗号分隔 |
/// | STORE_BACKEND | sheets | `sheets` 或 `memory` |
/// | SHEET_ID | sheets 时必填 | 表格 ID |
/// | GOOGLE_SHEETS_CREDS | sheets 时必填 | 服务账号 JSON |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | - | 设置后按天滚动写入文件 |
/// | POLL_TIMEOUT_SECS | 50 | 长轮询超时 (秒) |
/// | HTTP_TIMEOUT_SECS | 90 | HTTP 请求超时 (秒) |
///
/// # 示例
///
/// ```ignore
/// BOT_TOKEN=123:abc ADMIN_IDS=1163346232 STORE_BACKEND=memory cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// 管理员白名单 - 唯一的访问控制
    pub admin_ids: BTreeSet<UserId>,
    pub store: StoreBackend,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub poll_timeout_secs: u64,
    pub http_timeout_secs: u64,
}

impl Config {
    /// 从环境变量加载配置 (调用前先执行 dotenv)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// 测试时传入闭包，避免修改进程环境变量
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bot_token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let admin_ids = parse_admin_ids(&get("ADMIN_IDS").ok_or(ConfigError::Missing("ADMIN_IDS"))?)?;

        let store = match get("STORE_BACKEND").as_deref().unwrap_or("sheets") {
            "sheets" => StoreBackend::Sheets {
                spreadsheet_id: get("SHEET_ID").ok_or(ConfigError::Missing("SHEET_ID"))?,
                credentials_json: get("GOOGLE_SHEETS_CREDS")
                    .ok_or(ConfigError::Missing("GOOGLE_SHEETS_CREDS"))?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::invalid(
                    "STORE_BACKEND",
                    format!("expected `sheets` or `memory`, got `{other}`"),
                ));
            }
        };

        Ok(Self {
            bot_token,
            admin_ids,
            store,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: get("LOG_JSON").is_some_and(|v| matches!(v.trim(), "1" | "true")),
            log_dir: get("LOG_DIR"),
            poll_timeout_secs: parse_secs(get("POLL_TIMEOUT_SECS"), "POLL_TIMEOUT_SECS", 50)?,
            http_timeout_secs: parse_secs(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", 90)?,
        })
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_ids.contains(&user_id)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// HTTP 超时需大于长轮询超时，否则 getUpdates 会被客户端提前中断
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(self.poll_timeout_secs + 10))
    }
}

fn parse_admin_ids(raw: &str) -> Result<BTreeSet<UserId>, ConfigError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<UserId>()
                .map_err(|_| ConfigError::invalid("ADMIN_IDS", format!("`{s}` is not a user id")))
        })
        .collect::<Result<BTreeSet<_>, _>>()?;

    if ids.is_empty() {
        return Err(ConfigError::invalid("ADMIN_IDS", "at least one admin id is required"));
    }
    Ok(ids)
}

fn parse_secs(raw: Option<String>, name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(name, format!("`{v}` is not a number of seconds"))),
    }
}
