//! Transport layer
//!
//! Feeds platform updates to the [`Engine`] one at a time and delivers the
//! messages it returns. Delivery failures are logged; the engine's state
//! change stands.

pub mod telegram;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::Engine;
use telegram::{BotApi, Update};

/// Pause after a failed poll before asking again
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API {method} failed ({code}): {description}")]
    Api {
        method: String,
        code: u16,
        description: String,
    },
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Long-polling update loop
pub struct Poller {
    api: BotApi,
    engine: Arc<Engine>,
    poll_timeout: Duration,
    shutdown: CancellationToken,
}

impl Poller {
    pub fn new(
        api: BotApi,
        engine: Arc<Engine>,
        poll_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            api,
            engine,
            poll_timeout,
            shutdown,
        }
    }

    /// Run until the shutdown token is cancelled
    pub async fn run(self) -> TransportResult<()> {
        let mut offset = self.api.skip_pending().await?;
        info!(?offset, "Polling started");

        loop {
            let batch = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                batch = self.api.get_updates(offset, self.poll_timeout) => batch,
            };

            let updates = match batch {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed");
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = tokio::time::sleep(POLL_ERROR_PAUSE) => continue,
                    }
                }
            };

            // 串行处理：下一条更新等待当前更新完成
            for update in updates {
                offset = Some(update.update_id + 1);
                self.process(update).await;
            }
        }

        info!("Polling stopped");
        Ok(())
    }

    async fn process(&self, update: Update) {
        if let Some(query) = &update.callback_query
            && let Err(e) = self.api.answer_callback(&query.id).await
        {
            warn!(error = %e, "answerCallbackQuery failed");
        }

        let Some(inbound) = update.to_inbound() else {
            debug!(update_id = update.update_id, "Update ignored");
            return;
        };

        // 单独任务处理：panic 只丢弃这一条更新
        let engine = Arc::clone(&self.engine);
        let user_id = inbound.user_id();
        let outbox = match tokio::spawn(async move { engine.handle(inbound).await }).await {
            Ok(outbox) => outbox,
            Err(e) => {
                error!(user_id, update_id = update.update_id, error = %e, "Update handler aborted");
                return;
            }
        };

        for message in outbox {
            if let Err(e) = self.api.send_message(&message).await {
                warn!(recipient = message.recipient, error = %e, "Message not delivered");
            }
        }
    }
}
