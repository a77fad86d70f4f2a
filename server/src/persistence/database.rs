//! PostgreSQL database operations.

use sqlx::{PgPool, Row, postgres::{PgPoolOptions, PgRow}};
use idle_shared::{BaseStats, CharacterClass, LeaderboardEntry, ProgressSnapshot};

use super::{ArenaMatchRecord, HuntingLogEntry, QueueEntry, StoreError};
use crate::entities::{Character, CharacterId, ItemInstance};

/// Columns selected (or returned) for a full character row
const CHARACTER_COLUMNS: &str = "id, account_id, name, class, level, experience, zen, hp, mp,
     current_map, x, y, strength, agility, vitality, energy, command,
     kills, deaths, guild_id, max_damage";

const ITEM_COLUMNS: &str = "character_id, name, slot, damage_min, damage_max, defense,
     required_str, required_agi, required_ene, enhancement_level,
     durability, max_durability, equipped";

fn character_from_row(row: &PgRow) -> Result<Character, sqlx::Error> {
    let class_name: String = row.try_get("class")?;
    Ok(Character {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        name: row.try_get("name")?,
        class: CharacterClass::from_name(&class_name).unwrap_or(CharacterClass::DarkKnight),
        level: row.try_get::<i32, _>("level")? as u32,
        experience: row.try_get::<i64, _>("experience")? as u64,
        zen: row.try_get::<i64, _>("zen")? as u64,
        hp: row.try_get::<i32, _>("hp")? as u32,
        mp: row.try_get::<i32, _>("mp")? as u32,
        current_map: row.try_get("current_map")?,
        x: row.try_get("x")?,
        y: row.try_get("y")?,
        stats: BaseStats {
            strength: row.try_get::<i32, _>("strength")? as u32,
            agility: row.try_get::<i32, _>("agility")? as u32,
            vitality: row.try_get::<i32, _>("vitality")? as u32,
            energy: row.try_get::<i32, _>("energy")? as u32,
            command: row.try_get::<i32, _>("command")? as u32,
        },
        kills: row.try_get::<i32, _>("kills")? as u32,
        deaths: row.try_get::<i32, _>("deaths")? as u32,
        guild_id: row.try_get("guild_id")?,
        max_damage: row.try_get::<Option<i32>, _>("max_damage")?.map(|d| d as u32),
    })
}

fn item_from_row(row: &PgRow) -> Result<ItemInstance, sqlx::Error> {
    Ok(ItemInstance {
        character_id: row.try_get("character_id")?,
        name: row.try_get("name")?,
        slot: row.try_get("slot")?,
        damage_min: row.try_get::<i32, _>("damage_min")? as u32,
        damage_max: row.try_get::<i32, _>("damage_max")? as u32,
        defense: row.try_get::<i32, _>("defense")? as u32,
        required_strength: row.try_get::<i32, _>("required_str")? as u32,
        required_agility: row.try_get::<i32, _>("required_agi")? as u32,
        required_energy: row.try_get::<i32, _>("required_ene")? as u32,
        enhancement: row.try_get::<i32, _>("enhancement_level")? as u32,
        durability: row.try_get::<i32, _>("durability")? as u32,
        max_durability: row.try_get::<i32, _>("max_durability")? as u32,
        equipped: row.try_get("equipped")?,
    })
}

fn queue_entry_from_row(row: &PgRow) -> Result<QueueEntry, sqlx::Error> {
    Ok(QueueEntry {
        character_id: row.try_get("character_id")?,
        level: row.try_get::<i32, _>("level")? as u32,
        level_min: row.try_get::<i32, _>("level_min")? as u32,
        level_max: row.try_get::<i32, _>("level_max")? as u32,
        ticket: row.try_get::<i64, _>("ticket")? as u64,
        enqueued_at: row.try_get("queue_time")?,
    })
}

/// Database connection wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    // =========================================================================
    // Character Operations
    // =========================================================================

    pub async fn load_character(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM characters WHERE id = $1", CHARACTER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(character_from_row).transpose()?)
    }

    /// Write hunting progress, returning the updated row
    pub async fn update_progress(&self, id: CharacterId, progress: &ProgressSnapshot) -> Result<Character, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE characters
             SET level = $2, experience = $3, zen = $4, hp = $5, mp = $6, last_active = NOW()
             WHERE id = $1
             RETURNING {}",
            CHARACTER_COLUMNS
        ))
            .bind(id)
            .bind(progress.level as i32)
            .bind(progress.experience as i64)
            .bind(progress.zen as i64)
            .bind(progress.hp as i32)
            .bind(progress.mp as i32)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or(StoreError::MissingRow(id))?;
        Ok(character_from_row(&row)?)
    }

    // =========================================================================
    // Inventory Operations
    // =========================================================================

    pub async fn insert_item(&self, item: &ItemInstance) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO items (character_id, name, slot, damage_min, damage_max, defense,
                                required_str, required_agi, required_ene, enhancement_level,
                                durability, max_durability, equipped, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW())"
        )
            .bind(item.character_id)
            .bind(&item.name)
            .bind(&item.slot)
            .bind(item.damage_min as i32)
            .bind(item.damage_max as i32)
            .bind(item.defense as i32)
            .bind(item.required_strength as i32)
            .bind(item.required_agility as i32)
            .bind(item.required_energy as i32)
            .bind(item.enhancement as i32)
            .bind(item.durability as i32)
            .bind(item.max_durability as i32)
            .bind(item.equipped)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn equipped_items(&self, character_id: CharacterId) -> Result<Vec<ItemInstance>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM items WHERE character_id = $1 AND equipped = TRUE ORDER BY id",
            ITEM_COLUMNS
        ))
            .bind(character_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(item_from_row).collect::<Result<_, _>>()?)
    }

    /// Swap the item in `slot` for one unequipped copy of `item_name`
    pub async fn equip_item(&self, character_id: CharacterId, item_name: &str, slot: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE items SET equipped = FALSE WHERE character_id = $1 AND slot = $2")
            .bind(character_id)
            .bind(slot)
            .execute(&mut *tx)
            .await?;

        let equipped = sqlx::query(
            "UPDATE items SET equipped = TRUE
             WHERE id = (
                 SELECT id FROM items
                 WHERE character_id = $1 AND name = $2 AND equipped = FALSE
                 ORDER BY id
                 LIMIT 1
             )"
        )
            .bind(character_id)
            .bind(item_name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if equipped == 0 {
            // Leave the slot as it was
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    // =========================================================================
    // Logs and Arena History
    // =========================================================================

    pub async fn insert_hunting_log(&self, entry: &HuntingLogEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO hunting_logs (character_id, monster_name, experience_gained, zen_gained, item_found)
             VALUES ($1, $2, $3, $4, $5)"
        )
            .bind(entry.character_id)
            .bind(&entry.monster)
            .bind(entry.experience_gained as i64)
            .bind(entry.zen_gained as i64)
            .bind(entry.item_found.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert the match and apply both participants' counters in one transaction.
    /// Returns the match id and the updated winner and loser rows.
    pub async fn record_arena_match(
        &self,
        record: &ArenaMatchRecord,
    ) -> Result<(i64, Character, Character), StoreError> {
        let mut tx = self.pool.begin().await?;

        let match_id: i64 = sqlx::query_scalar(
            "INSERT INTO arena_matches (player1_id, player2_id, winner_id, player1_damage, player2_damage,
                                        zen_reward, exp_reward)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id"
        )
            .bind(record.player1_id)
            .bind(record.player2_id)
            .bind(record.winner_id)
            .bind(record.player1_power as i64)
            .bind(record.player2_power as i64)
            .bind(record.zen_reward as i64)
            .bind(record.exp_reward as i64)
            .fetch_one(&mut *tx)
            .await?;

        let winner = sqlx::query(&format!(
            "UPDATE characters SET kills = kills + 1, zen = zen + $2, experience = experience + $3
             WHERE id = $1
             RETURNING {}",
            CHARACTER_COLUMNS
        ))
            .bind(record.winner_id)
            .bind(record.zen_reward as i64)
            .bind(record.exp_reward as i64)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::MissingRow(record.winner_id))?;

        let loser_id = record.loser_id();
        let loser = sqlx::query(&format!(
            "UPDATE characters SET deaths = deaths + 1 WHERE id = $1 RETURNING {}",
            CHARACTER_COLUMNS
        ))
            .bind(loser_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::MissingRow(loser_id))?;

        // Dropping `tx` on an early return rolls everything back
        tx.commit().await?;

        Ok((match_id, character_from_row(&winner)?, character_from_row(&loser)?))
    }

    pub async fn arena_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT name, level, kills, deaths,
                    CASE WHEN deaths > 0
                         THEN ROUND(kills::numeric / deaths, 2)::float8
                         ELSE kills::float8
                    END AS kd_ratio
             FROM characters
             WHERE kills > 0
             ORDER BY kills DESC, kd_ratio DESC
             LIMIT $1"
        )
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let entries = rows
            .iter()
            .map(|r| -> Result<LeaderboardEntry, sqlx::Error> {
                Ok(LeaderboardEntry {
                    name: r.try_get("name")?,
                    level: r.try_get::<i32, _>("level")? as u32,
                    kills: r.try_get::<i32, _>("kills")? as u32,
                    deaths: r.try_get::<i32, _>("deaths")? as u32,
                    kd_ratio: r.try_get("kd_ratio")?,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(entries)
    }

    // =========================================================================
    // Arena Queue
    // =========================================================================

    pub async fn upsert_queue_entry(&self, entry: &QueueEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO arena_queue (character_id, level, level_min, level_max, ticket, queue_time)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (character_id) DO UPDATE SET
                level = EXCLUDED.level,
                level_min = EXCLUDED.level_min,
                level_max = EXCLUDED.level_max,
                ticket = EXCLUDED.ticket,
                queue_time = EXCLUDED.queue_time"
        )
            .bind(entry.character_id)
            .bind(entry.level as i32)
            .bind(entry.level_min as i32)
            .bind(entry.level_max as i32)
            .bind(entry.ticket as i64)
            .bind(entry.enqueued_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_queue_candidate(
        &self,
        character_id: CharacterId,
        level_min: u32,
        level_max: u32,
    ) -> Result<Option<QueueEntry>, StoreError> {
        let row = sqlx::query(
            "SELECT character_id, level, level_min, level_max, ticket, queue_time
             FROM arena_queue
             WHERE character_id <> $1 AND level_min <= $3 AND level_max >= $2
             ORDER BY queue_time ASC, ticket ASC
             LIMIT 1"
        )
            .bind(character_id)
            .bind(level_min as i32)
            .bind(level_max as i32)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(queue_entry_from_row).transpose()?)
    }

    pub async fn delete_queue_entries(&self, character_ids: &[CharacterId]) -> Result<u64, StoreError> {
        let deleted = sqlx::query("DELETE FROM arena_queue WHERE character_id = ANY($1)")
            .bind(character_ids)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }
}
