//! Inventory item owned by a character.

use serde::{Deserialize, Serialize};
use idle_shared::ItemArchetype;

use super::CharacterId;

/// Durability a freshly dropped item starts with
pub const DEFAULT_DURABILITY: u32 = 100;

/// An item in a character's inventory, referencing a catalog archetype by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInstance {
    pub character_id: CharacterId,
    pub name: String,
    pub slot: String,
    pub damage_min: u32,
    pub damage_max: u32,
    pub defense: u32,
    pub required_strength: u32,
    pub required_agility: u32,
    pub required_energy: u32,
    pub enhancement: u32,
    pub durability: u32,
    pub max_durability: u32,
    pub equipped: bool,
}

impl ItemInstance {
    /// Fresh unequipped copy of an archetype
    pub fn from_archetype(character_id: CharacterId, archetype: &ItemArchetype) -> Self {
        let (damage_min, damage_max) = archetype.damage.unwrap_or((0, 0));
        Self {
            character_id,
            name: archetype.name.to_string(),
            slot: archetype.slot.as_str().to_string(),
            damage_min,
            damage_max,
            defense: archetype.defense.unwrap_or(0),
            required_strength: archetype.requirements.strength,
            required_agility: archetype.requirements.agility,
            required_energy: archetype.requirements.energy,
            enhancement: 0,
            durability: DEFAULT_DURABILITY,
            max_durability: DEFAULT_DURABILITY,
            equipped: false,
        }
    }
}
