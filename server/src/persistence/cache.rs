//! Redis cache for hot character snapshots.

use redis::{AsyncCommands, aio::ConnectionManager};

use super::StoreError;
use crate::entities::{Character, CharacterId};

/// Cache key prefix for character snapshots
const CHARACTER_PREFIX: &str = "char:snapshot:";

/// TTL for cached data (1 hour)
const CACHE_TTL_SECONDS: u64 = 3600;

fn character_key(character_id: CharacterId) -> String {
    format!("{}{}", CHARACTER_PREFIX, character_id)
}

/// Redis cache wrapper
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
}

impl Cache {
    /// Connect to Redis
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// Store a character snapshot
    pub async fn save_character(&self, character: &Character) -> Result<(), StoreError> {
        let json = serde_json::to_string(character)?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(character_key(character.id), json, CACHE_TTL_SECONDS).await?;

        Ok(())
    }

    /// Drop a character snapshot
    pub async fn evict_character(&self, character_id: CharacterId) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(character_key(character_id)).await?;
        Ok(())
    }

    /// Load a character snapshot; stale or unreadable entries count as a miss
    pub async fn load_character(&self, character_id: CharacterId) -> Result<Option<Character>, StoreError> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(character_key(character_id)).await?;

        Ok(json.and_then(|j| serde_json::from_str(&j).ok()))
    }
}
