//! Network protocol definitions shared between client and server.

use serde::{Deserialize, Serialize};

use crate::items::ItemRarity;

/// Protocol version for compatibility checking
pub const PROTOCOL_VERSION: u32 = 3;

/// Default server port
pub const DEFAULT_PORT: u16 = 7777;

/// Seconds between two hunting ticks
pub const HUNT_INTERVAL_SECS: u64 = 3;

/// Number of rows returned by the arena leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

// =============================================================================
// Shared Payloads
// =============================================================================

/// Character progress after a tick, mirrored to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub level: u32,
    pub experience: u64,
    pub zen: u64,
    pub hp: u32,
    pub mp: u32,
}

/// Outcome of a single hunting tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuntReport {
    pub success: bool,
    pub monster: String,
    pub exp_gained: u64,
    pub zen_gained: u64,
    pub item_found: Option<String>,
    pub item_rarity: Option<ItemRarity>,
    pub level_up: bool,
    pub new_level: Option<u32>,
    pub message: String,
    pub character: ProgressSnapshot,
}

/// Outcome of an arena battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaReport {
    pub match_id: i64,
    pub winner_id: u64,
    pub winner_name: String,
    pub loser_id: u64,
    pub loser_name: String,
    pub player1_power: u64,
    pub player2_power: u64,
    pub zen_reward: u64,
    pub exp_reward: u64,
    pub battle_log: String,
}

/// Arena leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub level: u32,
    pub kills: u32,
    pub deaths: u32,
    pub kd_ratio: f64,
}

// =============================================================================
// Client -> Server Messages
// =============================================================================

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Bind this connection to a character
    JoinGame {
        protocol_version: u32,
        character_id: u64,
    },

    /// Start the idle hunting loop
    StartHunting,

    /// Stop the idle hunting loop
    StopHunting,

    /// Enter the arena queue
    JoinArena,

    /// Leave the arena queue
    LeaveArena,

    /// Request the arena leaderboard
    GetArenaLeaderboard,

    /// Equip an item from the inventory
    EquipItem {
        item_name: String,
    },

    /// Keep-alive
    Heartbeat,

    /// Disconnect gracefully
    Disconnect,
}

// =============================================================================
// Server -> Client Messages
// =============================================================================

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Connection is bound to a character
    GameJoined {
        character_id: u64,
        name: String,
        level: u32,
        current_map: String,
    },

    /// Join refused
    JoinFailed {
        reason: String,
    },

    HuntingStarted {
        interval_secs: u64,
    },

    HuntingStopped,

    HuntingFailed {
        reason: String,
    },

    /// One hunting tick resolved
    HuntResult(HuntReport),

    /// Waiting in the arena queue
    ArenaQueued {
        level_min: u32,
        level_max: u32,
    },

    ArenaLeft,

    ArenaFailed {
        reason: String,
    },

    /// An arena battle involving this character was resolved
    ArenaResult(ArenaReport),

    ArenaLeaderboard {
        entries: Vec<LeaderboardEntry>,
    },

    /// Result of an equip request
    EquipResult {
        success: bool,
        message: String,
        damage: Option<(u32, u32)>,
        defense: Option<u32>,
    },
}

impl ClientMessage {
    pub fn serialize(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

impl ServerMessage {
    pub fn serialize(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hunt_result_survives_the_wire() {
        let msg = ServerMessage::HuntResult(HuntReport {
            success: true,
            monster: "Goblin".into(),
            exp_gained: 14,
            zen_gained: 3,
            item_found: Some("Short Sword".into()),
            item_rarity: Some(ItemRarity::Common),
            level_up: false,
            new_level: None,
            message: "Defeated Goblin! +14 EXP, +3 Zen, Found: Short Sword".into(),
            character: ProgressSnapshot { level: 10, experience: 14, zen: 3, hp: 100, mp: 50 },
        });

        let bytes = msg.serialize().unwrap();
        match ServerMessage::deserialize(&bytes).unwrap() {
            ServerMessage::HuntResult(report) => {
                assert_eq!(report.monster, "Goblin");
                assert_eq!(report.item_rarity, Some(ItemRarity::Common));
                assert_eq!(report.character.experience, 14);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(ClientMessage::deserialize(&[0xff, 0xff, 0xff, 0xff, 0xff]).is_err());
    }
}
