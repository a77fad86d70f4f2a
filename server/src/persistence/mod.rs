//! Persistence layer for the idle server.
//!
//! The game core talks to storage through [`GameStore`]. Two implementations
//! exist: [`PersistentStore`] (PostgreSQL with an optional Redis snapshot
//! cache) and [`MemoryStore`], used by tests and when no database is reachable.

mod cache;
mod database;
mod memory;

pub use cache::Cache;
pub use database::Database;
pub use memory::MemoryStore;

use async_trait::async_trait;
use log::{info, warn};
use thiserror::Error;
use idle_shared::{LeaderboardEntry, ProgressSnapshot};

use crate::entities::{Character, CharacterId, ItemInstance};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no row for character {0}")]
    MissingRow(CharacterId),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Records
// =============================================================================

/// One line of a character's hunting history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuntingLogEntry {
    pub character_id: CharacterId,
    pub monster: String,
    pub experience_gained: u64,
    pub zen_gained: u64,
    pub item_found: Option<String>,
}

/// Stored result of an arena battle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaMatchRecord {
    pub player1_id: CharacterId,
    pub player2_id: CharacterId,
    pub winner_id: CharacterId,
    pub player1_power: u64,
    pub player2_power: u64,
    pub zen_reward: u64,
    pub exp_reward: u64,
}

impl ArenaMatchRecord {
    pub fn loser_id(&self) -> CharacterId {
        if self.winner_id == self.player1_id {
            self.player2_id
        } else {
            self.player1_id
        }
    }
}

/// A character waiting in the arena queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub character_id: CharacterId,
    pub level: u32,
    pub level_min: u32,
    pub level_max: u32,
    /// Tie-breaker for entries enqueued in the same millisecond
    pub ticket: u64,
    /// Unix time in milliseconds
    pub enqueued_at: i64,
}

impl QueueEntry {
    /// Whether this entry's band overlaps `[level_min, level_max]`
    pub fn overlaps(&self, level_min: u32, level_max: u32) -> bool {
        self.level_min <= level_max && self.level_max >= level_min
    }

    /// Queue order: oldest first
    pub fn order_key(&self) -> (i64, u64) {
        (self.enqueued_at, self.ticket)
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// Record-level storage used by hunting, arena and equipment operations
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, StoreError>;

    /// Authoritative read for a caller about to write the character back.
    /// Stores with a snapshot cache must bypass it here.
    async fn load_character_for_update(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        self.get_character(id).await
    }

    /// Overwrite the progress columns touched by a hunting tick
    async fn update_character_progress(
        &self,
        id: CharacterId,
        progress: &ProgressSnapshot,
    ) -> Result<(), StoreError>;

    async fn insert_inventory_item(&self, item: &ItemInstance) -> Result<(), StoreError>;

    async fn append_hunting_log(&self, entry: &HuntingLogEntry) -> Result<(), StoreError>;

    /// Store a match result and apply its PvP counters as one unit,
    /// returning the match id. The winner gets a kill plus the rewards and
    /// the loser a death; on error nothing is written.
    async fn record_arena_match(&self, record: &ArenaMatchRecord) -> Result<i64, StoreError>;

    /// Insert or replace the entry for `entry.character_id`
    async fn upsert_queue_entry(&self, entry: &QueueEntry) -> Result<(), StoreError>;

    /// Oldest entry other than `character_id` whose band overlaps `[level_min, level_max]`
    async fn find_queue_candidate(
        &self,
        character_id: CharacterId,
        level_min: u32,
        level_max: u32,
    ) -> Result<Option<QueueEntry>, StoreError>;

    /// Delete entries for the given characters, returning how many existed
    async fn delete_queue_entries(&self, character_ids: &[CharacterId]) -> Result<u64, StoreError>;

    async fn arena_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;

    async fn equipped_items(&self, character_id: CharacterId) -> Result<Vec<ItemInstance>, StoreError>;

    /// Clear `slot` and equip one unequipped copy of `item_name`.
    /// Returns false when the character owns no such item.
    async fn equip_item(&self, character_id: CharacterId, item_name: &str, slot: &str) -> Result<bool, StoreError>;
}

/// Leaderboard K/D: kills per death rounded to two decimals, or kills when deathless
pub fn kd_ratio(kills: u32, deaths: u32) -> f64 {
    if deaths == 0 {
        kills as f64
    } else {
        (kills as f64 / deaths as f64 * 100.0).round() / 100.0
    }
}

// =============================================================================
// PostgreSQL + Redis
// =============================================================================

/// Database-backed store with an optional snapshot cache in front of reads
#[derive(Clone)]
pub struct PersistentStore {
    db: Database,
    cache: Option<Cache>,
}

impl PersistentStore {
    pub fn new(db: Database, cache: Option<Cache>) -> Self {
        Self { db, cache }
    }

    /// Replace the cached snapshot. If that fails the old snapshot is
    /// evicted, since serving it would hide the write that just committed.
    async fn refresh_cache(&self, character: &Character) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save_character(character).await {
                warn!("Failed to cache character {}: {}", character.id, e);
                if let Err(e) = cache.evict_character(character.id).await {
                    warn!("Failed to evict stale snapshot of character {}: {}", character.id, e);
                }
            }
        }
    }
}

#[async_trait]
impl GameStore for PersistentStore {
    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        if let Some(cache) = &self.cache {
            match cache.load_character(id).await {
                Ok(Some(character)) => return Ok(Some(character)),
                Ok(None) => {}
                Err(e) => warn!("Cache read for character {} failed: {}", id, e),
            }
        }

        let character = self.db.load_character(id).await?;
        if let Some(character) = &character {
            self.refresh_cache(character).await;
        }
        Ok(character)
    }

    async fn load_character_for_update(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        self.db.load_character(id).await
    }

    async fn update_character_progress(
        &self,
        id: CharacterId,
        progress: &ProgressSnapshot,
    ) -> Result<(), StoreError> {
        let updated = self.db.update_progress(id, progress).await?;
        self.refresh_cache(&updated).await;
        Ok(())
    }

    async fn insert_inventory_item(&self, item: &ItemInstance) -> Result<(), StoreError> {
        self.db.insert_item(item).await
    }

    async fn append_hunting_log(&self, entry: &HuntingLogEntry) -> Result<(), StoreError> {
        self.db.insert_hunting_log(entry).await
    }

    async fn record_arena_match(&self, record: &ArenaMatchRecord) -> Result<i64, StoreError> {
        let (match_id, winner, loser) = self.db.record_arena_match(record).await?;
        self.refresh_cache(&winner).await;
        self.refresh_cache(&loser).await;
        Ok(match_id)
    }

    async fn upsert_queue_entry(&self, entry: &QueueEntry) -> Result<(), StoreError> {
        self.db.upsert_queue_entry(entry).await
    }

    async fn find_queue_candidate(
        &self,
        character_id: CharacterId,
        level_min: u32,
        level_max: u32,
    ) -> Result<Option<QueueEntry>, StoreError> {
        self.db.find_queue_candidate(character_id, level_min, level_max).await
    }

    async fn delete_queue_entries(&self, character_ids: &[CharacterId]) -> Result<u64, StoreError> {
        self.db.delete_queue_entries(character_ids).await
    }

    async fn arena_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.db.arena_leaderboard(limit).await
    }

    async fn equipped_items(&self, character_id: CharacterId) -> Result<Vec<ItemInstance>, StoreError> {
        self.db.equipped_items(character_id).await
    }

    async fn equip_item(&self, character_id: CharacterId, item_name: &str, slot: &str) -> Result<bool, StoreError> {
        self.db.equip_item(character_id, item_name, slot).await
    }
}

/// Connect to PostgreSQL and, when a URL is given, Redis.
///
/// A Redis failure only disables the cache; a database failure is returned.
pub async fn init(database_url: &str, redis_url: Option<&str>) -> Result<PersistentStore, StoreError> {
    let db = Database::connect(database_url).await?;
    info!("Connected to PostgreSQL");

    let cache = match redis_url {
        Some(url) => match Cache::connect(url).await {
            Ok(cache) => {
                info!("Connected to Redis");
                Some(cache)
            }
            Err(e) => {
                warn!("Failed to connect to Redis: {}", e);
                warn!("Character snapshots will not be cached");
                None
            }
        },
        None => {
            info!("No Redis URL configured, running without cache");
            None
        }
    };

    Ok(PersistentStore::new(db, cache))
}
