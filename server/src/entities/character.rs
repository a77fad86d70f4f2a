//! Persisted character record.

use serde::{Deserialize, Serialize};
use idle_shared::{BaseStats, CharacterClass, ProgressSnapshot, STARTING_MAP};

/// Database id of a character
pub type CharacterId = i64;

/// Starting hit points for every class
const BASE_HP: u32 = 100;

/// Starting mana for every class
const BASE_MP: u32 = 50;

/// Spawn coordinates on the starting map
const SPAWN_POSITION: (i32, i32) = (130, 125);

/// A character as stored by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub account_id: i64,
    pub name: String,
    pub class: CharacterClass,
    pub level: u32,
    pub experience: u64,
    pub zen: u64,
    pub hp: u32,
    pub mp: u32,
    pub current_map: String,
    pub x: i32,
    pub y: i32,
    pub stats: BaseStats,
    pub kills: u32,
    pub deaths: u32,
    pub guild_id: Option<i64>,
    /// Upper damage bound used for arena power; unset means the default
    pub max_damage: Option<u32>,
}

impl Character {
    /// Create a level 1 character with the class's starting attributes
    pub fn new(id: CharacterId, account_id: i64, name: impl Into<String>, class: CharacterClass) -> Self {
        Self {
            id,
            account_id,
            name: name.into(),
            class,
            level: 1,
            experience: 0,
            zen: 0,
            hp: BASE_HP,
            mp: BASE_MP,
            current_map: STARTING_MAP.to_string(),
            x: SPAWN_POSITION.0,
            y: SPAWN_POSITION.1,
            stats: class.base_stats(),
            kills: 0,
            deaths: 0,
            guild_id: None,
            max_damage: None,
        }
    }

    /// Builder-style level override, mostly for fixtures
    pub fn at_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// The columns touched by a hunting tick
    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            level: self.level,
            experience: self.experience,
            zen: self.zen,
            hp: self.hp,
            mp: self.mp,
        }
    }

    /// Overwrite progress columns from a snapshot
    pub fn set_progress(&mut self, progress: &ProgressSnapshot) {
        self.level = progress.level;
        self.experience = progress.experience;
        self.zen = progress.zen;
        self.hp = progress.hp;
        self.mp = progress.mp;
    }
}
