//! Arena queue and PvP settlement.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use rand::Rng;
use tokio::sync::Mutex;
use idle_shared::{ArenaReport, LeaderboardEntry};

use crate::combat::{self, ArenaOutcome};
use crate::entities::CharacterId;
use crate::error::{GameError, Result};
use crate::locks::CharacterLocks;
use crate::persistence::{ArenaMatchRecord, GameStore, QueueEntry};

/// Levels above and below a character that it can be matched against
pub const LEVEL_BAND: u32 = 10;

/// Inclusive level band a character of `level` queues with
pub fn level_band(level: u32) -> (u32, u32) {
    (level.saturating_sub(LEVEL_BAND).max(1), level.saturating_add(LEVEL_BAND))
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A settled arena battle
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaMatch {
    pub match_id: i64,
    pub outcome: ArenaOutcome,
}

impl ArenaMatch {
    pub fn report(&self) -> ArenaReport {
        let o = &self.outcome;
        ArenaReport {
            match_id: self.match_id,
            winner_id: o.winner_id as u64,
            winner_name: o.winner_name.clone(),
            loser_id: o.loser_id as u64,
            loser_name: o.loser_name.clone(),
            player1_power: o.player1_power,
            player2_power: o.player2_power,
            zen_reward: o.zen_reward,
            exp_reward: o.exp_reward,
            battle_log: o.battle_log.clone(),
        }
    }
}

/// Result of joining the queue
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    /// No opponent yet; the character waits with this band
    Queued { level_min: u32, level_max: u32 },
    /// Paired and fought immediately
    Matched(ArenaMatch),
}

pub struct Matchmaker {
    store: Arc<dyn GameStore>,
    locks: Arc<CharacterLocks>,
    /// Serializes queue insert, candidate search and removal
    queue_lock: Mutex<()>,
    next_ticket: AtomicU64,
}

impl Matchmaker {
    pub fn new(store: Arc<dyn GameStore>, locks: Arc<CharacterLocks>) -> Self {
        Self {
            store,
            locks,
            queue_lock: Mutex::new(()),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Enqueue a character and fight the oldest compatible opponent, if any.
    ///
    /// Re-joining refreshes the character's entry. If the chosen opponent is
    /// claimed elsewhere between lookup and removal, the character stays queued.
    pub async fn join_queue<R: Rng + Send + ?Sized>(&self, character_id: CharacterId, rng: &mut R) -> Result<JoinOutcome> {
        let character = self
            .store
            .get_character(character_id)
            .await?
            .ok_or(GameError::CharacterNotFound(character_id))?;
        let (level_min, level_max) = level_band(character.level);

        let (own_entry, opponent_entry) = {
            let _queue = self.queue_lock.lock().await;

            let entry = QueueEntry {
                character_id,
                level: character.level,
                level_min,
                level_max,
                ticket: self.next_ticket.fetch_add(1, Ordering::SeqCst),
                enqueued_at: now_millis(),
            };
            self.store.upsert_queue_entry(&entry).await?;

            let Some(candidate) = self.store.find_queue_candidate(character_id, level_min, level_max).await? else {
                debug!("Character {} queued for arena ({}-{})", character_id, level_min, level_max);
                return Ok(JoinOutcome::Queued { level_min, level_max });
            };

            if self.store.delete_queue_entries(&[candidate.character_id]).await? == 0 {
                debug!("Arena opponent {} was claimed elsewhere", candidate.character_id);
                return Ok(JoinOutcome::Queued { level_min, level_max });
            }
            self.store.delete_queue_entries(&[character_id]).await?;
            (entry, candidate)
        };

        let settled = match self.settle(character_id, opponent_entry.character_id, rng).await {
            Ok(settled) => settled,
            Err(e) => {
                // Nothing was recorded, so both fighters go back where they were
                if !e.is_not_found() {
                    self.requeue(&[opponent_entry, own_entry]).await;
                }
                return Err(e);
            }
        };
        info!(
            "Arena match {}: {} defeated {}",
            settled.match_id, settled.outcome.winner_name, settled.outcome.loser_name
        );
        Ok(JoinOutcome::Matched(settled))
    }

    async fn requeue(&self, entries: &[QueueEntry]) {
        let _queue = self.queue_lock.lock().await;
        for entry in entries {
            if let Err(e) = self.store.upsert_queue_entry(entry).await {
                warn!("Failed to requeue character {}: {}", entry.character_id, e);
            }
        }
    }

    /// Fight two dequeued characters and persist the result
    async fn settle<R: Rng + Send + ?Sized>(
        &self,
        player1_id: CharacterId,
        player2_id: CharacterId,
        rng: &mut R,
    ) -> Result<ArenaMatch> {
        let _guards = self.locks.lock_pair(player1_id, player2_id).await;

        let player1 = self
            .store
            .load_character_for_update(player1_id)
            .await?
            .ok_or(GameError::CharacterNotFound(player1_id))?;
        let player2 = self
            .store
            .load_character_for_update(player2_id)
            .await?
            .ok_or(GameError::CharacterNotFound(player2_id))?;

        let outcome = combat::resolve_arena_battle(&player1, &player2, rng);

        let match_id = self
            .store
            .record_arena_match(&ArenaMatchRecord {
                player1_id,
                player2_id,
                winner_id: outcome.winner_id,
                player1_power: outcome.player1_power,
                player2_power: outcome.player2_power,
                zen_reward: outcome.zen_reward,
                exp_reward: outcome.exp_reward,
            })
            .await?;

        Ok(ArenaMatch { match_id, outcome })
    }

    /// Remove a character from the queue. Returns false if it was not queued.
    pub async fn leave_queue(&self, character_id: CharacterId) -> Result<bool> {
        let _queue = self.queue_lock.lock().await;
        Ok(self.store.delete_queue_entries(&[character_id]).await? > 0)
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        Ok(self.store.arena_leaderboard(limit).await?)
    }
}
