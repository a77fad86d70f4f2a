//! Applies resolver outcomes to character state.

use idle_shared::item;

use crate::combat::{ArenaOutcome, HuntOutcome};
use crate::entities::{Character, ItemInstance};

/// Hit points granted per level gained
pub const HP_PER_LEVEL: u32 = 20;

/// Mana granted per level gained
pub const MP_PER_LEVEL: u32 = 10;

/// What a hunt result changed on a character
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardApplication {
    pub levels_gained: u32,
    /// Inventory record to persist for a dropped catalog item
    pub new_item: Option<ItemInstance>,
}

impl RewardApplication {
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Experience needed to advance from `level` to `level + 1`
pub fn exp_to_next_level(level: u32) -> u64 {
    let level = level as u64;
    let prev = level.saturating_sub(1);
    level * 1000 + prev * prev * 100
}

/// Apply a hunt outcome to a character snapshot.
///
/// A single reward may cross several thresholds; each level gained grants
/// its own hp/mp bonus.
pub fn apply_hunt_result(character: &mut Character, outcome: &HuntOutcome) -> RewardApplication {
    let mut applied = RewardApplication::default();
    if !outcome.success {
        return applied;
    }

    character.experience += outcome.exp_gained;
    character.zen += outcome.zen_gained;

    loop {
        let needed = exp_to_next_level(character.level);
        if character.experience < needed {
            break;
        }
        character.experience -= needed;
        character.level += 1;
        character.hp += HP_PER_LEVEL;
        character.mp += MP_PER_LEVEL;
        applied.levels_gained += 1;
    }

    // Drops without catalog data have nothing to copy into an inventory record
    applied.new_item = outcome
        .drop
        .and_then(|drop| item(drop.name))
        .map(|archetype| ItemInstance::from_archetype(character.id, archetype));

    applied
}

/// Apply arena counters to in-memory snapshots of both participants.
///
/// Arena experience is added without a level-up check, matching the stored
/// counter update.
pub fn apply_pvp_result(winner: &mut Character, loser: &mut Character, outcome: &ArenaOutcome) {
    winner.kills += 1;
    winner.zen += outcome.zen_reward;
    winner.experience += outcome.exp_reward;
    loser.deaths += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ItemDrop;
    use idle_shared::{CharacterClass, ItemRarity};

    fn win(exp: u64, zen: u64) -> HuntOutcome {
        HuntOutcome {
            success: true,
            monster: "Goblin",
            exp_gained: exp,
            zen_gained: zen,
            drop: None,
            message: String::new(),
        }
    }

    fn character(level: u32) -> Character {
        Character::new(7, 1, "Tester", CharacterClass::DarkWizard).at_level(level)
    }

    #[test]
    fn test_exp_curve_values() {
        assert_eq!(exp_to_next_level(1), 1000);
        assert_eq!(exp_to_next_level(2), 2100);
        assert_eq!(exp_to_next_level(10), 18100);
    }

    #[test]
    fn test_exp_curve_strictly_increasing() {
        for level in 1..2000 {
            assert!(exp_to_next_level(level + 1) > exp_to_next_level(level), "level {}", level);
        }
    }

    #[test]
    fn test_failed_hunt_changes_nothing() {
        let mut c = character(10);
        let before = c.clone();
        let mut outcome = win(500, 50);
        outcome.success = false;

        let applied = apply_hunt_result(&mut c, &outcome);
        assert_eq!(c, before);
        assert_eq!(applied, RewardApplication::default());
    }

    #[test]
    fn test_small_reward_no_level_up() {
        let mut c = character(10);
        let applied = apply_hunt_result(&mut c, &win(15, 3));
        assert!(!applied.leveled_up());
        assert_eq!((c.level, c.experience, c.zen), (10, 15, 3));
        assert_eq!((c.hp, c.mp), (100, 50));
    }

    #[test]
    fn test_multi_level_up_grants_each_bonus() {
        let mut c = character(1);
        // 1000 to reach 2, 2100 to reach 3, 50 left over
        let applied = apply_hunt_result(&mut c, &win(3150, 0));
        assert_eq!(applied.levels_gained, 2);
        assert_eq!((c.level, c.experience), (3, 50));
        assert_eq!(c.hp, 100 + 2 * HP_PER_LEVEL);
        assert_eq!(c.mp, 50 + 2 * MP_PER_LEVEL);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut c = character(1);
        let mut total_seen = 0u64;
        for i in 0..400 {
            let level_before = c.level;
            let exp_before = c.experience;
            let gained = 40 + (i % 7) * 31;
            let applied = apply_hunt_result(&mut c, &win(gained, 1));
            total_seen += gained;

            assert!(c.level >= level_before);
            if applied.leveled_up() {
                assert!(c.experience < exp_to_next_level(c.level));
            } else {
                assert_eq!(c.experience, exp_before + gained);
            }
        }
        let banked: u64 = (1..c.level).map(exp_to_next_level).sum::<u64>() + c.experience;
        assert_eq!(banked, total_seen);
        assert_eq!(c.zen, 400);
    }

    #[test]
    fn test_catalog_drop_creates_inventory_record() {
        let mut c = character(10);
        let mut outcome = win(10, 1);
        outcome.drop = Some(ItemDrop { name: "Short Sword", rarity: ItemRarity::Common });

        let item = apply_hunt_result(&mut c, &outcome).new_item.expect("item");
        assert_eq!(item.character_id, 7);
        assert_eq!(item.name, "Short Sword");
        assert_eq!(item.slot, "weapon");
        assert_eq!((item.damage_min, item.damage_max), (1, 4));
        assert!(!item.equipped);
        assert_eq!(item.enhancement, 0);
        assert_eq!(item.durability, 100);
    }

    #[test]
    fn test_uncataloged_drop_is_not_stored() {
        let mut c = character(10);
        let mut outcome = win(10, 1);
        outcome.drop = Some(ItemDrop { name: "Chain Lightning", rarity: ItemRarity::Common });
        assert!(apply_hunt_result(&mut c, &outcome).new_item.is_none());
    }

    #[test]
    fn test_pvp_counters() {
        let mut winner = character(25);
        let mut loser = character(20);
        let outcome = ArenaOutcome {
            winner_id: winner.id,
            winner_name: winner.name.clone(),
            loser_id: loser.id,
            loser_name: loser.name.clone(),
            player1_power: 260,
            player2_power: 200,
            zen_reward: 2100,
            exp_reward: 1050,
            battle_log: String::new(),
        };
        apply_pvp_result(&mut winner, &mut loser, &outcome);
        assert_eq!((winner.kills, winner.zen, winner.experience), (1, 2100, 1050));
        assert_eq!(loser.deaths, 1);
        assert_eq!(loser.zen, 0);
    }
}
