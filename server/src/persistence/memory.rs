//! In-process store, used by tests and when no database is reachable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use idle_shared::{CharacterClass, LeaderboardEntry, ProgressSnapshot};

use super::{kd_ratio, ArenaMatchRecord, GameStore, HuntingLogEntry, QueueEntry, StoreError};
use crate::entities::{Character, CharacterId, ItemInstance};

#[derive(Default)]
struct MemoryState {
    characters: HashMap<CharacterId, Character>,
    items: Vec<ItemInstance>,
    hunting_logs: Vec<HuntingLogEntry>,
    matches: Vec<ArenaMatchRecord>,
    queue: HashMap<CharacterId, QueueEntry>,
    /// Served by `get_character` ahead of `characters`, like a read cache
    snapshots: HashMap<CharacterId, Character>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_writes: AtomicBool,
    fail_item_writes: AtomicBool,
}

impl MemoryStore {
    /// A handful of characters so the server is usable without a database
    pub fn with_demo_characters() -> Self {
        let demo = [
            (1, "Aldric", CharacterClass::DarkKnight, 10),
            (2, "Mirelle", CharacterClass::DarkWizard, 20),
            (3, "Sylwen", CharacterClass::FairyElf, 25),
            (4, "Varian", CharacterClass::MagicGladiator, 40),
            (5, "Corvus", CharacterClass::DarkLord, 60),
            (6, "Lyra", CharacterClass::Summoner, 1),
        ];

        let mut state = MemoryState::default();
        for (id, name, class, level) in demo {
            state.characters.insert(id, Character::new(id, id, name, class).at_level(level));
        }

        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

/// Inspection and fault hooks for tests
#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_character(&self, character: Character) {
        self.state.lock().await.characters.insert(character.id, character);
    }

    /// Make every write fail with [`StoreError::Unavailable`] until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make only inventory inserts fail
    pub fn set_fail_item_writes(&self, fail: bool) {
        self.fail_item_writes.store(fail, Ordering::SeqCst);
    }

    /// Serve `snapshot` from `get_character` until the next write to that character
    pub async fn set_snapshot(&self, snapshot: Character) {
        self.state.lock().await.snapshots.insert(snapshot.id, snapshot);
    }

    pub async fn inventory(&self, character_id: CharacterId) -> Vec<ItemInstance> {
        let state = self.state.lock().await;
        state.items.iter().filter(|i| i.character_id == character_id).cloned().collect()
    }

    pub async fn hunting_logs(&self, character_id: CharacterId) -> Vec<HuntingLogEntry> {
        let state = self.state.lock().await;
        state.hunting_logs.iter().filter(|l| l.character_id == character_id).cloned().collect()
    }

    pub async fn arena_matches(&self) -> Vec<ArenaMatchRecord> {
        self.state.lock().await.matches.clone()
    }

    pub async fn queued_characters(&self) -> Vec<CharacterId> {
        let state = self.state.lock().await;
        let mut entries: Vec<&QueueEntry> = state.queue.values().collect();
        entries.sort_by_key(|e| e.order_key());
        entries.iter().map(|e| e.character_id).collect()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.snapshots.get(&id).or_else(|| state.characters.get(&id)).cloned())
    }

    async fn load_character_for_update(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        Ok(self.state.lock().await.characters.get(&id).cloned())
    }

    async fn update_character_progress(
        &self,
        id: CharacterId,
        progress: &ProgressSnapshot,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;
        let character = state.characters.get_mut(&id).ok_or(StoreError::MissingRow(id))?;
        character.set_progress(progress);
        state.snapshots.remove(&id);
        Ok(())
    }

    async fn insert_inventory_item(&self, item: &ItemInstance) -> Result<(), StoreError> {
        self.check_writable()?;
        if self.fail_item_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("inventory writes disabled".to_string()));
        }
        self.state.lock().await.items.push(item.clone());
        Ok(())
    }

    async fn append_hunting_log(&self, entry: &HuntingLogEntry) -> Result<(), StoreError> {
        self.check_writable()?;
        self.state.lock().await.hunting_logs.push(entry.clone());
        Ok(())
    }

    async fn record_arena_match(&self, record: &ArenaMatchRecord) -> Result<i64, StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;
        let loser_id = record.loser_id();
        for id in [record.winner_id, loser_id] {
            if !state.characters.contains_key(&id) {
                return Err(StoreError::MissingRow(id));
            }
        }

        if let Some(winner) = state.characters.get_mut(&record.winner_id) {
            winner.kills += 1;
            winner.zen += record.zen_reward;
            winner.experience += record.exp_reward;
        }
        if let Some(loser) = state.characters.get_mut(&loser_id) {
            loser.deaths += 1;
        }
        for id in [record.winner_id, loser_id] {
            state.snapshots.remove(&id);
        }

        state.matches.push(record.clone());
        Ok(state.matches.len() as i64)
    }

    async fn upsert_queue_entry(&self, entry: &QueueEntry) -> Result<(), StoreError> {
        self.state.lock().await.queue.insert(entry.character_id, entry.clone());
        Ok(())
    }

    async fn find_queue_candidate(
        &self,
        character_id: CharacterId,
        level_min: u32,
        level_max: u32,
    ) -> Result<Option<QueueEntry>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .queue
            .values()
            .filter(|e| e.character_id != character_id && e.overlaps(level_min, level_max))
            .min_by_key(|e| e.order_key())
            .cloned())
    }

    async fn delete_queue_entries(&self, character_ids: &[CharacterId]) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let deleted = character_ids.iter().filter(|id| state.queue.remove(*id).is_some()).count();
        Ok(deleted as u64)
    }

    async fn arena_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let state = self.state.lock().await;
        let mut entries: Vec<LeaderboardEntry> = state
            .characters
            .values()
            .filter(|c| c.kills > 0)
            .map(|c| LeaderboardEntry {
                name: c.name.clone(),
                level: c.level,
                kills: c.kills,
                deaths: c.deaths,
                kd_ratio: kd_ratio(c.kills, c.deaths),
            })
            .collect();

        entries.sort_by(|a, b| b.kills.cmp(&a.kills).then(b.kd_ratio.total_cmp(&a.kd_ratio)));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn equipped_items(&self, character_id: CharacterId) -> Result<Vec<ItemInstance>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .iter()
            .filter(|i| i.character_id == character_id && i.equipped)
            .cloned()
            .collect())
    }

    async fn equip_item(&self, character_id: CharacterId, item_name: &str, slot: &str) -> Result<bool, StoreError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;

        let Some(index) = state
            .items
            .iter()
            .position(|i| i.character_id == character_id && i.name == item_name && !i.equipped)
        else {
            return Ok(false);
        };

        for item in state.items.iter_mut() {
            if item.character_id == character_id && item.slot == slot {
                item.equipped = false;
            }
        }
        state.items[index].equipped = true;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(character_id: CharacterId, level: u32, ticket: u64) -> QueueEntry {
        QueueEntry {
            character_id,
            level,
            level_min: level.saturating_sub(10).max(1),
            level_max: level + 10,
            ticket,
            enqueued_at: 1_000,
        }
    }

    #[tokio::test]
    async fn test_queue_candidate_is_oldest_overlapping() {
        let store = MemoryStore::new();
        store.upsert_queue_entry(&entry(1, 20, 1)).await.unwrap();
        store.upsert_queue_entry(&entry(2, 80, 2)).await.unwrap();
        store.upsert_queue_entry(&entry(3, 22, 3)).await.unwrap();

        let found = store.find_queue_candidate(4, 15, 35).await.unwrap().unwrap();
        assert_eq!(found.character_id, 1);
        assert!(store.find_queue_candidate(4, 200, 220).await.unwrap().is_none());
        // Never matches itself
        let found = store.find_queue_candidate(1, 10, 30).await.unwrap().unwrap();
        assert_eq!(found.character_id, 3);
    }

    #[tokio::test]
    async fn test_delete_counts_only_existing_entries() {
        let store = MemoryStore::new();
        store.upsert_queue_entry(&entry(1, 20, 1)).await.unwrap();
        assert_eq!(store.delete_queue_entries(&[1, 2]).await.unwrap(), 1);
        assert_eq!(store.delete_queue_entries(&[1]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_equip_swaps_slot() {
        let store = MemoryStore::new();
        let sword = idle_shared::item("Short Sword").unwrap();
        let rapier = idle_shared::item("Rapier").unwrap();
        store.insert_inventory_item(&ItemInstance::from_archetype(1, sword)).await.unwrap();
        store.insert_inventory_item(&ItemInstance::from_archetype(1, rapier)).await.unwrap();

        assert!(store.equip_item(1, "Short Sword", "weapon").await.unwrap());
        assert!(store.equip_item(1, "Rapier", "weapon").await.unwrap());

        let equipped = store.equipped_items(1).await.unwrap();
        assert_eq!(equipped.len(), 1);
        assert_eq!(equipped[0].name, "Rapier");

        // Missing item leaves the slot alone
        assert!(!store.equip_item(1, "Blade", "weapon").await.unwrap());
        assert_eq!(store.equipped_items(1).await.unwrap()[0].name, "Rapier");
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = MemoryStore::with_demo_characters();
        store.set_fail_writes(true);
        let progress = ProgressSnapshot { level: 2, experience: 0, zen: 0, hp: 120, mp: 60 };
        assert!(matches!(
            store.update_character_progress(1, &progress).await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_fail_writes(false);
        store.update_character_progress(1, &progress).await.unwrap();
        assert_eq!(store.get_character(1).await.unwrap().unwrap().level, 2);
    }

    #[tokio::test]
    async fn test_arena_match_is_all_or_nothing() {
        let store = MemoryStore::with_demo_characters();
        let record = ArenaMatchRecord {
            player1_id: 2,
            player2_id: 3,
            winner_id: 3,
            player1_power: 168,
            player2_power: 208,
            zen_reward: 2000,
            exp_reward: 1000,
        };

        store.set_fail_writes(true);
        assert!(store.record_arena_match(&record).await.is_err());
        assert!(store.arena_matches().await.is_empty());
        assert_eq!(store.get_character(3).await.unwrap().unwrap().kills, 0);

        // A missing participant rejects the whole record
        store.set_fail_writes(false);
        let orphan = ArenaMatchRecord { player2_id: 99, winner_id: 99, ..record.clone() };
        assert!(matches!(store.record_arena_match(&orphan).await, Err(StoreError::MissingRow(99))));
        assert!(store.arena_matches().await.is_empty());
        assert_eq!(store.get_character(2).await.unwrap().unwrap().deaths, 0);

        assert_eq!(store.record_arena_match(&record).await.unwrap(), 1);
        let winner = store.get_character(3).await.unwrap().unwrap();
        let loser = store.get_character(2).await.unwrap().unwrap();
        assert_eq!((winner.kills, winner.zen, winner.experience), (1, 2000, 1000));
        assert_eq!(loser.deaths, 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_bypassed_for_update() {
        let store = MemoryStore::with_demo_characters();
        let mut stale = store.get_character(1).await.unwrap().unwrap();
        stale.zen = 7;
        store.set_snapshot(stale).await;

        assert_eq!(store.get_character(1).await.unwrap().unwrap().zen, 7);
        assert_eq!(store.load_character_for_update(1).await.unwrap().unwrap().zen, 0);

        let progress = ProgressSnapshot { level: 10, experience: 5, zen: 3, hp: 100, mp: 50 };
        store.update_character_progress(1, &progress).await.unwrap();
        assert_eq!(store.get_character(1).await.unwrap().unwrap().zen, 3);
    }

    #[tokio::test]
    async fn test_leaderboard_ordering() {
        let store = MemoryStore::new();
        for (id, kills, deaths) in [(1, 5, 5), (2, 5, 1), (3, 9, 9), (4, 0, 3)] {
            let mut c = Character::new(id, id, format!("P{}", id), CharacterClass::DarkKnight);
            c.kills = kills;
            c.deaths = deaths;
            store.insert_character(c).await;
        }

        let board = store.arena_leaderboard(10).await.unwrap();
        let names: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["P3", "P2", "P1"]);
        assert_eq!(board[1].kd_ratio, 5.0);
        assert_eq!(store.arena_leaderboard(1).await.unwrap().len(), 1);
    }
}
