#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use order_bot::engine::menu;
use order_bot::{CachedStore, Engine, MemorySessionStore, MemoryStore, RecordStore, SessionStore};
use rust_decimal::Decimal;
use shared::models::Product;
use shared::{Inbound, Outbound, UserId};

pub const ADMIN: UserId = 1163346232;
pub const AZIZ: UserId = 42;

pub struct Harness {
    pub engine: Engine,
    pub store: Arc<CachedStore<MemoryStore>>,
    pub sessions: Arc<MemorySessionStore>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(CachedStore::new(MemoryStore::new()));
        let sessions = Arc::new(MemorySessionStore::new());
        let engine = Engine::new(store.clone(), sessions.clone(), BTreeSet::from([ADMIN]));
        Self {
            engine,
            store,
            sessions,
        }
    }

    pub async fn say(&self, user_id: UserId, text: &str) -> Vec<Outbound> {
        self.engine
            .handle(Inbound::Text {
                user_id,
                text: text.to_string(),
            })
            .await
    }

    pub async fn locate(&self, user_id: UserId, lat: f64, lon: f64) -> Vec<Outbound> {
        self.engine
            .handle(Inbound::Location { user_id, lat, lon })
            .await
    }

    pub async fn press(&self, user_id: UserId, token: &str) -> Vec<Outbound> {
        self.engine
            .handle(Inbound::Button {
                user_id,
                token: token.to_string(),
            })
            .await
    }

    /// Full registration through the chat
    pub async fn register(&self, user_id: UserId, name: &str, role: &str) {
        self.say(user_id, menu::SAVE_DATA).await;
        self.say(user_id, name).await;
        self.say(user_id, "+998901234567").await;
        self.locate(user_id, 41.3, 69.2).await;
        self.say(user_id, role).await;
    }

    /// Group "Qurilish" with Cement at 50 000, 10 % bonus
    pub async fn seed_catalog(&self) {
        self.store.add_group("Qurilish").await.unwrap();
        self.store
            .upsert_product(&Product {
                group: "Qurilish".to_string(),
                name: "Cement".to_string(),
                price: Decimal::new(50000, 0),
                bonus_percent: Decimal::new(10, 0),
                quantity: 100,
            })
            .await
            .unwrap();
    }

    /// Cart with `quantity` Cement, up to the delivery location
    pub async fn fill_cart(&self, user_id: UserId, quantity: &str) {
        self.say(user_id, menu::ORDER_PRODUCT).await;
        self.press(user_id, "g:Qurilish").await;
        self.press(user_id, "p:Cement").await;
        self.say(user_id, quantity).await;
        self.press(user_id, "cart").await;
    }

    pub fn session_state(&self, user_id: UserId) -> &'static str {
        self.sessions.load(user_id).state.name()
    }
}

/// The only message sent to `recipient`
pub fn message_to(out: &[Outbound], recipient: UserId) -> &Outbound {
    let mut found = out.iter().filter(|m| m.recipient == recipient);
    let message = found.next().expect("no message for recipient");
    assert!(found.next().is_none(), "more than one message for recipient");
    message
}
