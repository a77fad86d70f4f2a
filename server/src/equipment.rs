//! Equipment requirements and derived combat stats.

use log::debug;
use thiserror::Error;
use idle_shared::{item, ItemArchetype};

use crate::combat;
use crate::entities::{Character, ItemInstance};
use crate::error::{GameError, Result};
use crate::persistence::GameStore;

/// Minimum damage of an unarmed character
const BASE_MIN_DAMAGE: u32 = 5;

/// Why a character may not equip an item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipRefusal {
    #[error("Requires level {0}")]
    Level(u32),
    #[error("Requires {0} Strength")]
    Strength(u32),
    #[error("Requires {0} Agility")]
    Agility(u32),
    #[error("Requires {0} Energy")]
    Energy(u32),
    #[error("Item not found in inventory")]
    NotOwned,
}

/// Combat stats derived from equipped items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatStats {
    pub damage: (u32, u32),
    pub defense: u32,
    pub total_attack: u32,
}

/// Result of an equip request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipOutcome {
    pub success: bool,
    pub message: String,
    /// Stats after the change; absent when nothing was equipped
    pub stats: Option<CombatStats>,
}

/// Check level and attribute prerequisites, level first
pub fn can_equip(character: &Character, archetype: &ItemArchetype) -> std::result::Result<(), EquipRefusal> {
    let req = &archetype.requirements;
    if character.level < req.level {
        return Err(EquipRefusal::Level(req.level));
    }
    if character.stats.strength < req.strength {
        return Err(EquipRefusal::Strength(req.strength));
    }
    if character.stats.agility < req.agility {
        return Err(EquipRefusal::Agility(req.agility));
    }
    if character.stats.energy < req.energy {
        return Err(EquipRefusal::Energy(req.energy));
    }
    Ok(())
}

/// Stats of `character` wearing `equipped`, starting from its own max damage
pub fn combat_stats(character: &Character, equipped: &[ItemInstance]) -> CombatStats {
    let mut min = BASE_MIN_DAMAGE;
    let mut max = combat::effective_max_damage(character.max_damage);
    let mut defense = 0;
    for item in equipped {
        min += item.damage_min;
        max += item.damage_max;
        defense += item.defense;
    }
    CombatStats {
        damage: (min, max),
        defense,
        total_attack: min + (max - min) / 2,
    }
}

/// Equip `item_name` from the character's inventory into its catalog slot
pub async fn equip_item(store: &dyn GameStore, character: &Character, item_name: &str) -> Result<EquipOutcome> {
    let archetype = item(item_name).ok_or_else(|| GameError::UnknownItem(item_name.to_string()))?;

    let refusal = match can_equip(character, archetype) {
        Ok(()) => {
            if store.equip_item(character.id, archetype.name, archetype.slot.as_str()).await? {
                None
            } else {
                Some(EquipRefusal::NotOwned)
            }
        }
        Err(refusal) => Some(refusal),
    };

    if let Some(refusal) = refusal {
        return Ok(EquipOutcome { success: false, message: refusal.to_string(), stats: None });
    }

    let stats = combat_stats(character, &store.equipped_items(character.id).await?);
    debug!(
        "'{}' equipped {}: damage {:?}, defense {}, attack {}",
        character.name, archetype.name, stats.damage, stats.defense, stats.total_attack
    );
    Ok(EquipOutcome {
        success: true,
        message: format!("{} equipped successfully", archetype.name),
        stats: Some(stats),
    })
}
