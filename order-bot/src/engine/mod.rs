//! Conversation engine
//!
//! One [`Engine::handle`] call per inbound update. The handler works on a
//! copy of every session it touches and writes them back only when the
//! whole update succeeded; side effects on the chat are returned as
//! [`Outbound`] messages and delivered by the transport.
//!
//! - [`customer`] - registration, profile edit, ordering, bonus
//! - [`admin`] - catalog management and listings
//! - [`decisions`] - approve/reject buttons pressed by administrators

mod admin;
mod customer;
mod decisions;
pub mod error;
pub mod menu;
pub mod texts;
pub mod token;

pub use error::{EngineError, EngineResult};
pub use token::Token;

use shared::{Inbound, Keyboard, Outbound, UserId};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info_span, warn};

use crate::session::{DialogueState, Session, SessionStore};
use crate::store::RecordStore;
use menu::Command;

/// Per-update working set
pub(crate) struct Context {
    user_id: UserId,
    /// Working copy of the caller's session
    session: Session,
    /// Working copies of other users' sessions touched by this update
    others: HashMap<UserId, Session>,
    outbox: Vec<Outbound>,
}

impl Context {
    fn new(user_id: UserId, session: Session) -> Self {
        Self {
            user_id,
            session,
            others: HashMap::new(),
            outbox: Vec::new(),
        }
    }

    fn reply(&mut self, text: impl Into<String>) {
        self.outbox.push(Outbound::text(self.user_id, text));
    }

    fn reply_with(&mut self, text: impl Into<String>, keyboard: Keyboard) {
        self.outbox
            .push(Outbound::text(self.user_id, text).with_keyboard(keyboard));
    }

    fn send(&mut self, recipient: UserId, text: impl Into<String>, keyboard: Option<Keyboard>) {
        let mut message = Outbound::text(recipient, text);
        message.keyboard = keyboard;
        self.outbox.push(message);
    }

    fn set_state(&mut self, state: DialogueState) {
        self.session.state = state;
    }

    /// Working copy of `user_id`'s session, loaded on first access
    fn session_of(&mut self, sessions: &dyn SessionStore, user_id: UserId) -> &mut Session {
        if user_id == self.user_id {
            return &mut self.session;
        }
        self.others
            .entry(user_id)
            .or_insert_with(|| sessions.load(user_id))
    }

    fn commit(self, sessions: &dyn SessionStore) -> Vec<Outbound> {
        for (user_id, session) in self.others {
            sessions.put(user_id, session);
        }
        sessions.put(self.user_id, self.session);
        self.outbox
    }
}

pub struct Engine {
    store: Arc<dyn RecordStore>,
    sessions: Arc<dyn SessionStore>,
    admins: BTreeSet<UserId>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionStore>,
        admins: BTreeSet<UserId>,
    ) -> Self {
        Self {
            store,
            sessions,
            admins,
        }
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admins.contains(&user_id)
    }

    /// Process one inbound update and return the messages to deliver
    ///
    /// Never fails: errors are turned into a reply for the caller.
    pub async fn handle(&self, inbound: Inbound) -> Vec<Outbound> {
        let span = info_span!("update", user_id = inbound.user_id(), kind = inbound.kind());
        self.handle_guarded(inbound).instrument(span).await
    }

    /// Run the update on a copy of the session, committed only on success
    ///
    /// Any failure leaves the stored session as it was before the update
    /// (reset instead for invariant errors), so a retry never sees a
    /// half-applied step.
    async fn handle_guarded(&self, inbound: Inbound) -> Vec<Outbound> {
        let user_id = inbound.user_id();
        let before = self.sessions.load(user_id);
        let mut ctx = Context::new(user_id, before.clone());

        match self.dispatch(&mut ctx, inbound).await {
            Ok(()) => {
                debug!(state = ctx.session.state.name(), "Update handled");
                ctx.commit(self.sessions.as_ref())
            }
            Err(err) if err.is_transient() => {
                warn!(error = %err, "Store unavailable, session kept");
                vec![Outbound::text(user_id, texts::NETWORK_ERROR)]
            }
            Err(EngineError::Invariant(reason)) => {
                warn!(%reason, state = before.state.name(), "Dialogue reset");
                let mut session = before;
                session.reset_dialogue();
                self.sessions.put(user_id, session);
                vec![Outbound::text(user_id, texts::RESTART)]
            }
            Err(err) => {
                error!(error = %err, state = before.state.name(), "Update failed");
                vec![Outbound::text(user_id, texts::GENERIC_ERROR)]
            }
        }
    }

    async fn dispatch(&self, ctx: &mut Context, inbound: Inbound) -> EngineResult<()> {
        match inbound {
            Inbound::Text { text, .. } => {
                if let Some(command) = Command::parse(&text)
                    && (!command.is_admin_command() || self.is_admin(ctx.user_id))
                {
                    return self.on_command(ctx, command).await;
                }
                self.on_text(ctx, &text).await
            }
            Inbound::Location { lat, lon, .. } => self.on_location(ctx, lat, lon).await,
            Inbound::Button { token, .. } => {
                let token: Token = token
                    .parse()
                    .map_err(|e: token::UnknownToken| EngineError::invariant(e.to_string()))?;
                if token.is_admin_only() && !self.is_admin(ctx.user_id) {
                    return Err(EngineError::invariant(format!(
                        "admin button {token} pressed by non-admin"
                    )));
                }
                self.on_button(ctx, token).await
            }
        }
    }

    /// Menu commands win over step input; they abandon the current flow
    async fn on_command(&self, ctx: &mut Context, command: Command) -> EngineResult<()> {
        if command == Command::Id {
            ctx.reply(texts::your_id(ctx.user_id));
            return Ok(());
        }
        ctx.session.reset_dialogue();

        match command {
            Command::Start => self.start(ctx).await,
            command if command.is_admin_command() => self.admin_command(ctx, command).await,
            command => self.customer_command(ctx, command).await,
        }
    }

    async fn start(&self, ctx: &mut Context) -> EngineResult<()> {
        if self.is_admin(ctx.user_id) {
            ctx.reply_with(texts::ADMIN_WELCOME, menu::admin_menu());
            return Ok(());
        }
        match self.store.find_customer(ctx.user_id).await? {
            Some(customer) => {
                ctx.reply_with(texts::welcome(&customer.name), menu::customer_menu(customer.role))
            }
            None => ctx.reply_with(texts::PLEASE_REGISTER, menu::unregistered_menu()),
        }
        Ok(())
    }

    async fn on_text(&self, ctx: &mut Context, text: &str) -> EngineResult<()> {
        match ctx.session.state.clone() {
            DialogueState::Idle => {
                ctx.reply(texts::CHOOSE_FROM_MENU);
                Ok(())
            }
            DialogueState::Customer(step) => self.customer_text(ctx, step, text).await,
            DialogueState::Admin(step) => self.admin_text(ctx, step, text).await,
        }
    }

    async fn on_location(&self, ctx: &mut Context, lat: f64, lon: f64) -> EngineResult<()> {
        match ctx.session.state.clone() {
            DialogueState::Customer(step) => self.customer_location(ctx, step, lat, lon).await,
            _ => {
                ctx.reply(texts::CHOOSE_FROM_MENU);
                Ok(())
            }
        }
    }

    async fn on_button(&self, ctx: &mut Context, token: Token) -> EngineResult<()> {
        match token {
            Token::Group(_) | Token::Product(_) | Token::ConfirmCart => {
                self.customer_button(ctx, token).await
            }
            Token::ConfirmOrder(_)
            | Token::RejectOrder(_)
            | Token::ConfirmStoredOrder(_)
            | Token::RejectStoredOrder(_)
            | Token::ApproveBonus(_)
            | Token::RejectBonus(_)
            | Token::ApproveEdit(_)
            | Token::RejectEdit(_) => self.decide(ctx, token).await,
            _ => self.admin_button(ctx, token).await,
        }
    }

    /// Send `text` to every administrator
    fn notify_admins(&self, ctx: &mut Context, text: &str, keyboard: Keyboard) {
        for admin in &self.admins {
            ctx.send(*admin, text, Some(keyboard.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CustomerStep, MemorySessionStore};
    use crate::store::MemoryStore;

    const ADMIN: UserId = 1;
    const USER: UserId = 42;

    fn engine() -> (Engine, Arc<MemoryStore>, Arc<MemorySessionStore>) {
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let engine = Engine::new(
            store.clone(),
            sessions.clone(),
            BTreeSet::from([ADMIN]),
        );
        (engine, store, sessions)
    }

    fn text(user_id: UserId, text: &str) -> Inbound {
        Inbound::Text {
            user_id,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_start_for_unregistered_user() {
        let (engine, _, _) = engine();
        let out = engine.handle(text(USER, "/start")).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, texts::PLEASE_REGISTER);
        assert_eq!(out[0].keyboard, Some(menu::unregistered_menu()));
    }

    #[tokio::test]
    async fn test_start_for_admin_shows_admin_menu() {
        let (engine, _, _) = engine();
        let out = engine.handle(text(ADMIN, "/start")).await;
        assert_eq!(out[0].text, texts::ADMIN_WELCOME);
        assert_eq!(out[0].keyboard, Some(menu::admin_menu()));
    }

    #[tokio::test]
    async fn test_id_command_keeps_dialogue() {
        let (engine, _, sessions) = engine();
        engine.handle(text(USER, menu::SAVE_DATA)).await;

        let out = engine.handle(text(USER, "/id")).await;

        assert_eq!(out[0].text, "Sizning ID: 42");
        assert_eq!(
            sessions.load(USER).state,
            DialogueState::Customer(CustomerStep::AwaitingName)
        );
    }

    #[tokio::test]
    async fn test_admin_labels_are_plain_text_for_customers() {
        let (engine, store, _) = engine();
        let out = engine.handle(text(USER, menu::ADD_GROUP)).await;
        assert_eq!(out[0].text, texts::CHOOSE_FROM_MENU);
        assert!(store.list_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_button_from_customer_is_rejected() {
        let (engine, _, _) = engine();
        let out = engine
            .handle(Inbound::Button {
                user_id: USER,
                token: "bc:42".to_string(),
            })
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, texts::RESTART);
    }

    #[tokio::test]
    async fn test_garbage_token_resets_dialogue() {
        let (engine, _, sessions) = engine();
        engine.handle(text(USER, menu::SAVE_DATA)).await;

        let out = engine
            .handle(Inbound::Button {
                user_id: USER,
                token: "??".to_string(),
            })
            .await;

        assert_eq!(out[0].text, texts::RESTART);
        assert!(sessions.get(USER).is_none());
    }

    #[tokio::test]
    async fn test_transient_failure_keeps_session() {
        let (engine, store, sessions) = engine();
        engine.handle(text(USER, menu::SAVE_DATA)).await;
        engine.handle(text(USER, "Aziz")).await;
        let before = sessions.load(USER);

        store.set_unavailable(true);
        let out = engine.handle(text(USER, "/start")).await;

        assert_eq!(out[0].text, texts::NETWORK_ERROR);
        assert_eq!(sessions.load(USER), before);
    }
}
