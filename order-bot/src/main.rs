use std::sync::Arc;

use anyhow::Context;
use order_bot::engine::Engine;
use order_bot::transport::Poller;
use order_bot::transport::telegram::BotApi;
use order_bot::{
    CachedStore, Config, MemorySessionStore, MemoryStore, RecordStore, SheetStore, StoreBackend,
    init_logger_with_file,
};
use sheets_client::{ServiceAccountKey, SheetsClient};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境变量与配置
    dotenv::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;

    // 2. 日志
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
    tracing::info!(admins = config.admin_ids.len(), "Order bot starting...");

    // 3. 记录存储
    let store = open_store(&config).await?;

    // 4. 会话引擎
    let engine = Arc::new(Engine::new(
        store,
        Arc::new(MemorySessionStore::new()),
        config.admin_ids.clone(),
    ));

    // 5. 长轮询，Ctrl-C 时停止
    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
        }
        ctrl_c.cancel();
    });

    let api = BotApi::new(&config.bot_token, config.http_timeout())?;
    Poller::new(api, engine, config.poll_timeout(), shutdown)
        .run()
        .await?;

    tracing::info!("Order bot stopped");
    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    match &config.store {
        StoreBackend::Sheets {
            spreadsheet_id,
            credentials_json,
        } => {
            let key = ServiceAccountKey::from_json(credentials_json)
                .context("GOOGLE_SHEETS_CREDS is not a service-account key")?;
            let client = SheetsClient::new(spreadsheet_id.as_str(), key, config.http_timeout())?;
            let sheets = SheetStore::new(client);
            sheets
                .ensure_headers()
                .await
                .context("failed to prepare worksheets")?;
            tracing::info!(%spreadsheet_id, "Using Google Sheets store");
            Ok(Arc::new(CachedStore::new(sheets)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Ok(Arc::new(CachedStore::new(MemoryStore::new())))
        }
    }
}
