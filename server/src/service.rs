//! Game core entry points used by the transport.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use idle_shared::{LeaderboardEntry, ServerMessage, LEADERBOARD_SIZE};

use crate::arena::{JoinOutcome, Matchmaker};
use crate::combat::{entropy_source, RngSource};
use crate::entities::{Character, CharacterId};
use crate::equipment::{self, EquipOutcome};
use crate::error::{GameError, Result};
use crate::hunting::HuntingController;
use crate::locks::CharacterLocks;
use crate::persistence::GameStore;
use crate::session::{EventSender, Session, SessionId, SessionStore};

pub struct GameService {
    store: Arc<dyn GameStore>,
    locks: Arc<CharacterLocks>,
    sessions: SessionStore,
    hunting: HuntingController,
    arena: Matchmaker,
    rng_source: RngSource,
}

impl GameService {
    pub fn new(store: Arc<dyn GameStore>, hunt_interval: Duration) -> Self {
        let locks = Arc::new(CharacterLocks::new());
        Self {
            hunting: HuntingController::new(Arc::clone(&store), Arc::clone(&locks), hunt_interval),
            arena: Matchmaker::new(Arc::clone(&store), Arc::clone(&locks)),
            sessions: SessionStore::new(),
            rng_source: entropy_source(),
            store,
            locks,
        }
    }

    /// Use `rng_source` for hunting loops and arena battles
    #[cfg(test)]
    pub fn with_rng_source(mut self, rng_source: RngSource) -> Self {
        self.hunting = self.hunting.with_rng_source(Arc::clone(&rng_source));
        self.rng_source = rng_source;
        self
    }

    async fn session(&self, session: SessionId) -> Result<Session> {
        self.sessions.get(session).await.ok_or(GameError::SessionNotFound(session))
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Bind a session to a character. Rebinding a session stops its hunt first.
    pub async fn on_session_join(
        &self,
        session: SessionId,
        character_id: CharacterId,
        outbound: EventSender,
    ) -> Result<Character> {
        let character = self
            .store
            .get_character(character_id)
            .await?
            .ok_or(GameError::CharacterNotFound(character_id))?;

        if self.hunting.is_hunting(session).await {
            self.hunting.stop(session).await;
        }
        self.sessions.insert(session, Session { character_id, outbound }).await;

        info!("Session {} joined as '{}' (level {})", session, character.name, character.level);
        Ok(character)
    }

    /// Disconnect: stop hunting and forget the session.
    /// Arena queue entries are left for an explicit leave.
    pub async fn on_session_end(&self, session: SessionId) {
        self.hunting.stop(session).await;
        if let Some(ended) = self.sessions.remove(session).await {
            info!("Session {} (character {}) ended", session, ended.character_id);
        }
    }

    // =========================================================================
    // Hunting
    // =========================================================================

    /// Start (or restart) the hunting loop, returning its interval
    pub async fn on_start_hunting(&self, session: SessionId) -> Result<Duration> {
        let bound = self.session(session).await?;
        self.hunting.start(session, bound.character_id, bound.outbound).await?;
        Ok(self.hunting.interval())
    }

    /// Returns false if the session was not hunting
    pub async fn on_stop_hunting(&self, session: SessionId) -> Result<bool> {
        self.session(session).await?;
        Ok(self.hunting.stop(session).await)
    }

    // =========================================================================
    // Arena
    // =========================================================================

    /// Queue the session's character. When a match is made, both
    /// participants' online sessions receive the result.
    pub async fn on_join_arena(&self, session: SessionId) -> Result<JoinOutcome> {
        let bound = self.session(session).await?;
        let mut rng = (self.rng_source)();
        let outcome = self.arena.join_queue(bound.character_id, &mut rng).await?;

        if let JoinOutcome::Matched(settled) = &outcome {
            let report = settled.report();
            for character_id in [settled.outcome.winner_id, settled.outcome.loser_id] {
                let msg = ServerMessage::ArenaResult(report.clone());
                if self.sessions.notify_character(character_id, &msg).await == 0 {
                    info!("Arena result for offline character {} stored only", character_id);
                }
            }
        }
        Ok(outcome)
    }

    /// Returns false if the character was not queued
    pub async fn on_leave_arena(&self, session: SessionId) -> Result<bool> {
        let bound = self.session(session).await?;
        self.arena.leave_queue(bound.character_id).await
    }

    pub async fn on_arena_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        self.arena.leaderboard(LEADERBOARD_SIZE).await
    }

    // =========================================================================
    // Equipment
    // =========================================================================

    pub async fn on_equip_item(&self, session: SessionId, item_name: &str) -> Result<EquipOutcome> {
        let bound = self.session(session).await?;
        let _guard = self.locks.lock(bound.character_id).await;

        let character = self
            .store
            .load_character_for_update(bound.character_id)
            .await?
            .ok_or(GameError::CharacterNotFound(bound.character_id))?;
        equipment::equip_item(self.store.as_ref(), &character, item_name).await
    }

    /// Stop every hunting loop and wait for them to drain
    pub async fn shutdown(&self) {
        self.hunting.stop_all().await;
        let remaining = self.sessions.ids().await.len();
        if remaining > 0 {
            warn!("Shutting down with {} sessions still bound", remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ItemInstance;
    use crate::persistence::MemoryStore;
    use idle_shared::CharacterClass;
    use rand::rngs::mock::StepRng;
    use rand::RngCore;
    use tokio::sync::mpsc;
    use tokio::time;

    const INTERVAL: Duration = Duration::from_secs(3);

    async fn service() -> (Arc<MemoryStore>, GameService) {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_character(Character::new(1, 1, "Hunter", CharacterClass::DarkKnight).at_level(10))
            .await;
        store
            .insert_character(Character::new(2, 2, "Archer", CharacterClass::FairyElf).at_level(20))
            .await;
        store
            .insert_character(Character::new(3, 3, "Knight", CharacterClass::DarkKnight).at_level(25))
            .await;
        let source: RngSource = Arc::new(|| -> Box<dyn RngCore + Send> { Box::new(StepRng::new(0, 0)) });
        let service = GameService::new(store.clone(), INTERVAL).with_rng_source(source);
        (store, service)
    }

    #[tokio::test]
    async fn test_join_unknown_character() {
        let (_store, service) = service().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = service.on_session_join(SessionId(1), 99, tx).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unbound_session_is_rejected() {
        let (_store, service) = service().await;
        let err = service.on_start_hunting(SessionId(5)).await.unwrap_err();
        assert!(matches!(err, GameError::SessionNotFound(SessionId(5))));
        assert!(service.on_join_arena(SessionId(5)).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hunting_through_session() {
        let (store, service) = service().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        service.on_session_join(SessionId(1), 1, tx).await.unwrap();

        assert_eq!(service.on_start_hunting(SessionId(1)).await.unwrap(), INTERVAL);
        time::sleep(INTERVAL + Duration::from_millis(1)).await;

        match rx.try_recv() {
            Ok(ServerMessage::HuntResult(report)) => {
                assert!(report.success);
                assert_eq!(report.character.experience, 12);
            }
            other => panic!("expected a hunt result, got {:?}", other),
        }

        assert!(service.on_stop_hunting(SessionId(1)).await.unwrap());
        assert!(!service.on_stop_hunting(SessionId(1)).await.unwrap());
        assert_eq!(store.get_character(1).await.unwrap().unwrap().experience, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_stops_hunting() {
        let (store, service) = service().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        service.on_session_join(SessionId(1), 1, tx).await.unwrap();
        service.on_start_hunting(SessionId(1)).await.unwrap();

        time::sleep(Duration::from_secs(1)).await;
        service.on_session_end(SessionId(1)).await;
        time::sleep(INTERVAL * 3).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(store.get_character(1).await.unwrap().unwrap().experience, 0);
        assert!(service.on_start_hunting(SessionId(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_arena_result_reaches_both_players() {
        let (store, service) = service().await;
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        service.on_session_join(SessionId(2), 2, tx2).await.unwrap();
        service.on_session_join(SessionId(3), 3, tx3).await.unwrap();

        let queued = service.on_join_arena(SessionId(2)).await.unwrap();
        assert_eq!(queued, JoinOutcome::Queued { level_min: 10, level_max: 30 });
        assert!(matches!(service.on_join_arena(SessionId(3)).await.unwrap(), JoinOutcome::Matched(_)));

        for rx in [&mut rx2, &mut rx3] {
            match rx.try_recv() {
                Ok(ServerMessage::ArenaResult(report)) => {
                    assert_eq!(report.winner_name, "Knight");
                    assert_eq!(report.loser_name, "Archer");
                }
                other => panic!("expected an arena result, got {:?}", other),
            }
        }
        assert!(store.queued_characters().await.is_empty());

        let board = service.on_arena_leaderboard().await.unwrap();
        assert_eq!(board[0].name, "Knight");
    }

    #[tokio::test]
    async fn test_disconnect_keeps_queue_entry() {
        let (store, service) = service().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        service.on_session_join(SessionId(2), 2, tx).await.unwrap();
        service.on_join_arena(SessionId(2)).await.unwrap();
        service.on_session_end(SessionId(2)).await;
        assert_eq!(store.queued_characters().await, vec![2]);

        let (tx, _rx) = mpsc::unbounded_channel();
        service.on_session_join(SessionId(9), 2, tx).await.unwrap();
        assert!(service.on_leave_arena(SessionId(9)).await.unwrap());
        assert!(!service.on_leave_arena(SessionId(9)).await.unwrap());
    }

    #[tokio::test]
    async fn test_equip_through_session() {
        let (store, service) = service().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        service.on_session_join(SessionId(1), 1, tx).await.unwrap();
        store
            .insert_inventory_item(&ItemInstance::from_archetype(1, idle_shared::item("Short Sword").unwrap()))
            .await
            .unwrap();

        let outcome = service.on_equip_item(SessionId(1), "Short Sword").await.unwrap();
        assert!(outcome.success);
        let outcome = service.on_equip_item(SessionId(1), "Blade").await.unwrap();
        assert_eq!(outcome.message, "Requires level 35");
    }
}
