//! Registry of online sessions and their outbound channels.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use tokio::sync::{mpsc, RwLock};
use idle_shared::ServerMessage;

use crate::entities::CharacterId;

/// Transport-assigned session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outbound event channel of one session
pub type EventSender = mpsc::UnboundedSender<ServerMessage>;

/// An online session bound to a character
#[derive(Debug, Clone)]
pub struct Session {
    pub character_id: CharacterId,
    pub outbound: EventSender,
}

/// Online sessions, keyed by session id
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a session to a character, replacing any previous binding
    pub async fn insert(&self, id: SessionId, session: Session) {
        self.sessions.write().await.insert(id, session);
    }

    pub async fn remove(&self, id: SessionId) -> Option<Session> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Every session currently playing `character_id`
    pub async fn sessions_for(&self, character_id: CharacterId) -> Vec<(SessionId, EventSender)> {
        self.sessions
            .read()
            .await
            .iter()
            .filter(|(_, s)| s.character_id == character_id)
            .map(|(id, s)| (*id, s.outbound.clone()))
            .collect()
    }

    /// Deliver a message to every session of a character.
    /// Returns how many sessions received it.
    pub async fn notify_character(&self, character_id: CharacterId, msg: &ServerMessage) -> usize {
        let mut delivered = 0;
        for (id, outbound) in self.sessions_for(character_id).await {
            if outbound.send(msg.clone()).is_ok() {
                delivered += 1;
            } else {
                debug!("Session {} already closed its outbound channel", id);
            }
        }
        delivered
    }

    pub async fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().copied().collect()
    }
}
