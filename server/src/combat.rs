//! Combat resolution for hunts and arena battles.
//!
//! Everything here is a pure function of its inputs and the random source
//! handed in by the caller, so outcomes can be pinned in tests with a mock
//! or seeded RNG.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use idle_shared::{map, rarity_of, ItemRarity, MapDef, MonsterDef};

use crate::entities::{Character, CharacterId};
use crate::error::{GameError, Result};

/// Success chance when character and monster are the same level
const BASE_SUCCESS_CHANCE: f64 = 0.70;

/// Success chance gained per level above the monster
const LEVEL_DIFF_FACTOR: f64 = 0.05;

const MIN_SUCCESS_CHANCE: f64 = 0.10;
const MAX_SUCCESS_CHANCE: f64 = 0.95;

/// Monsters up to this many levels above the character can be encountered
const ENCOUNTER_LEVEL_MARGIN: u32 = 20;

/// Chance that a won hunt drops an item
const DROP_CHANCE: f64 = 0.05;

/// Reward multiplier range, applied to hunt rewards and arena power
const VARIANCE_MIN: f64 = 0.8;
const VARIANCE_MAX: f64 = 1.2;

/// Max damage assumed when a character has none recorded
const DEFAULT_MAX_DAMAGE: u32 = 10;

/// Builds the random source for each hunting task or arena battle
pub type RngSource = Arc<dyn Fn() -> Box<dyn RngCore + Send> + Send + Sync>;

/// OS-seeded [`StdRng`] per call
pub fn entropy_source() -> RngSource {
    Arc::new(|| -> Box<dyn RngCore + Send> { Box::new(StdRng::from_entropy()) })
}

/// An item dropped by a defeated monster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDrop {
    pub name: &'static str,
    pub rarity: ItemRarity,
}

/// Result of one hunt resolution
#[derive(Debug, Clone, PartialEq)]
pub struct HuntOutcome {
    pub success: bool,
    pub monster: &'static str,
    pub exp_gained: u64,
    pub zen_gained: u64,
    pub drop: Option<ItemDrop>,
    pub message: String,
}

/// Result of one arena battle
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaOutcome {
    pub winner_id: CharacterId,
    pub winner_name: String,
    pub loser_id: CharacterId,
    pub loser_name: String,
    /// Adjusted power of the first participant, rounded down
    pub player1_power: u64,
    /// Adjusted power of the second participant, rounded down
    pub player2_power: u64,
    pub zen_reward: u64,
    pub exp_reward: u64,
    pub battle_log: String,
}

/// Probability of beating a monster, clamped to [0.10, 0.95]
pub fn success_chance(character_level: u32, monster_level: u32) -> f64 {
    let level_diff = character_level as f64 - monster_level as f64;
    (BASE_SUCCESS_CHANCE + level_diff * LEVEL_DIFF_FACTOR).clamp(MIN_SUCCESS_CHANCE, MAX_SUCCESS_CHANCE)
}

/// Monsters on `map` a character of `level` can run into
pub fn eligible_monsters(map: &MapDef, level: u32) -> Vec<&'static MonsterDef> {
    map.monster_defs()
        .filter(|m| m.level <= level.saturating_add(ENCOUNTER_LEVEL_MARGIN))
        .collect()
}

/// Resolve a hunt on the character's current map
pub fn resolve_hunt<R: Rng + ?Sized>(character: &Character, rng: &mut R) -> Result<HuntOutcome> {
    let map = map(&character.current_map).ok_or_else(|| GameError::UnknownMap(character.current_map.clone()))?;
    resolve_hunt_on(map, character.level, rng)
}

/// Resolve a hunt for a character of `level` on `map`
pub fn resolve_hunt_on<R: Rng + ?Sized>(map: &MapDef, level: u32, rng: &mut R) -> Result<HuntOutcome> {
    let candidates = eligible_monsters(map, level);
    if candidates.is_empty() {
        return Err(GameError::NoEligibleTarget { map: map.name.to_string(), level });
    }
    let monster = candidates[rng.gen_range(0..candidates.len())];

    if rng.gen::<f64>() > success_chance(level, monster.level) {
        return Ok(HuntOutcome {
            success: false,
            monster: monster.name,
            exp_gained: 0,
            zen_gained: 0,
            drop: None,
            message: format!("Failed to defeat {}", monster.name),
        });
    }

    let exp_gained = (monster.exp as f64 * rng.gen_range(VARIANCE_MIN..VARIANCE_MAX)).floor() as u64;
    let zen_gained = (monster.zen as f64 * rng.gen_range(VARIANCE_MIN..VARIANCE_MAX)).floor() as u64;

    let mut drop = None;
    if rng.gen::<f64>() < DROP_CHANCE && !monster.drops.is_empty() {
        let name = monster.drops[rng.gen_range(0..monster.drops.len())];
        drop = Some(ItemDrop { name, rarity: rarity_of(name) });
    }

    Ok(HuntOutcome {
        success: true,
        monster: monster.name,
        exp_gained,
        zen_gained,
        drop,
        message: victory_message(monster.name, exp_gained, zen_gained, drop.as_ref()),
    })
}

fn victory_message(monster: &str, exp_gained: u64, zen_gained: u64, drop: Option<&ItemDrop>) -> String {
    let mut message = format!("Defeated {}! +{} EXP, +{} Zen", monster, exp_gained, zen_gained);
    if let Some(found) = drop {
        message.push_str(&format!(", Found: {}", found.name));
    }
    message
}

impl HuntOutcome {
    /// Drop the found item from the outcome and its message
    pub fn forfeit_drop(&mut self) {
        if self.success && self.drop.take().is_some() {
            self.message = victory_message(self.monster, self.exp_gained, self.zen_gained, None);
        }
    }
}

/// Recorded max damage, with unset or zero meaning the default of 10
pub fn effective_max_damage(max_damage: Option<u32>) -> u32 {
    max_damage.filter(|d| *d > 0).unwrap_or(DEFAULT_MAX_DAMAGE)
}

/// Raw arena power before the random multiplier
pub fn arena_power(level: u32, max_damage: Option<u32>) -> f64 {
    level as f64 * 10.0 + effective_max_damage(max_damage) as f64
}

/// Resolve an arena battle between two characters.
///
/// Player one only wins on a strictly higher adjusted power.
pub fn resolve_arena_battle<R: Rng + ?Sized>(p1: &Character, p2: &Character, rng: &mut R) -> ArenaOutcome {
    let power1 = arena_power(p1.level, p1.max_damage) * rng.gen_range(VARIANCE_MIN..VARIANCE_MAX);
    let power2 = arena_power(p2.level, p2.max_damage) * rng.gen_range(VARIANCE_MIN..VARIANCE_MAX);

    let (winner, loser) = if power1 > power2 { (p1, p2) } else { (p2, p1) };

    let zen_reward = (loser.level as f64 * 100.0 + rng.gen_range(0.0..500.0)).floor() as u64;
    let exp_reward = (loser.level as f64 * 50.0 + rng.gen_range(0.0..200.0)).floor() as u64;

    ArenaOutcome {
        winner_id: winner.id,
        winner_name: winner.name.clone(),
        loser_id: loser.id,
        loser_name: loser.name.clone(),
        player1_power: power1.floor() as u64,
        player2_power: power2.floor() as u64,
        zen_reward,
        exp_reward,
        battle_log: format!("{} defeated {} in arena combat!", winner.name, loser.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_shared::CharacterClass;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha8Rng;

    /// Every draw returns zero: first candidate, guaranteed success, minimum rolls
    fn low_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    /// First candidate, then a roll of 0.96875 which beats any success chance
    fn failing_rng() -> StepRng {
        StepRng::new(0, 0xF800_0000_0000_0000)
    }

    fn hunter(level: u32) -> Character {
        Character::new(1, 1, "Hunter", CharacterClass::DarkKnight).at_level(level)
    }

    #[test]
    fn test_success_chance_is_clamped() {
        assert_eq!(success_chance(1, 500), MIN_SUCCESS_CHANCE);
        assert_eq!(success_chance(500, 1), MAX_SUCCESS_CHANCE);
        assert!((success_chance(10, 10) - 0.70).abs() < 1e-9);
        assert!((success_chance(10, 12) - 0.60).abs() < 1e-9);
    }

    #[test]
    fn test_eligible_monsters_respect_level_margin() {
        let noria = map("Noria").unwrap();
        // Budge Dragon 40, Larva 45 are within 25 + 20
        let names: Vec<_> = eligible_monsters(noria, 25).iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Budge Dragon", "Larva"]);
        assert_eq!(eligible_monsters(noria, 65).len(), 6);
    }

    #[test]
    fn test_lorencia_goblin_hunt() {
        let outcome = resolve_hunt(&hunter(10), &mut low_rng()).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.monster, "Goblin");
        assert!((12..=18).contains(&outcome.exp_gained));
        assert!((2..=4).contains(&outcome.zen_gained));
        assert_eq!(outcome.exp_gained, 12);
        assert_eq!(outcome.zen_gained, 2);

        // A zero roll is under the drop chance, so the first drop is taken
        let drop = outcome.drop.expect("drop");
        assert_eq!(drop.name, "Short Sword");
        assert_eq!(drop.rarity, ItemRarity::Common);
        assert_eq!(outcome.message, "Defeated Goblin! +12 EXP, +2 Zen, Found: Short Sword");
    }

    #[test]
    fn test_forfeit_drop_rewrites_message() {
        let mut outcome = resolve_hunt(&hunter(10), &mut low_rng()).unwrap();
        outcome.forfeit_drop();
        assert!(outcome.drop.is_none());
        assert_eq!(outcome.exp_gained, 12);
        assert_eq!(outcome.message, "Defeated Goblin! +12 EXP, +2 Zen");

        let mut failed = resolve_hunt(&hunter(10), &mut failing_rng()).unwrap();
        failed.forfeit_drop();
        assert_eq!(failed.message, "Failed to defeat Goblin");
    }

    #[test]
    fn test_failed_hunt_has_no_rewards() {
        let outcome = resolve_hunt(&hunter(10), &mut failing_rng()).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.monster, "Goblin");
        assert_eq!((outcome.exp_gained, outcome.zen_gained), (0, 0));
        assert!(outcome.drop.is_none());
        assert_eq!(outcome.message, "Failed to defeat Goblin");
    }

    #[test]
    fn test_hunt_rewards_stay_in_variance_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        let character = hunter(40);
        for _ in 0..500 {
            let outcome = resolve_hunt(&character, &mut rng).unwrap();
            if !outcome.success {
                continue;
            }
            let monster = idle_shared::monster_by_name(outcome.monster).unwrap();
            assert!(monster.level <= 60);
            assert!(outcome.exp_gained >= (monster.exp as f64 * 0.8).floor() as u64);
            assert!(outcome.exp_gained <= (monster.exp as f64 * 1.2).floor() as u64);
            assert!(outcome.zen_gained >= (monster.zen as f64 * 0.8).floor() as u64);
            assert!(outcome.zen_gained <= (monster.zen as f64 * 1.2).floor() as u64);
            if let Some(drop) = outcome.drop {
                assert!(monster.drops.contains(&drop.name));
            }
        }
    }

    #[test]
    fn test_no_eligible_target() {
        let mut character = hunter(1);
        character.current_map = "Silent Map".into();
        match resolve_hunt(&character, &mut low_rng()) {
            Err(GameError::NoEligibleTarget { map, level }) => {
                assert_eq!(map, "Silent Map");
                assert_eq!(level, 1);
            }
            other => panic!("expected NoEligibleTarget, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_map_is_not_found() {
        let mut character = hunter(10);
        character.current_map = "Atlantis".into();
        let err = resolve_hunt(&character, &mut low_rng()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_arena_power_defaults_max_damage() {
        assert_eq!(arena_power(20, None), 210.0);
        assert_eq!(arena_power(20, Some(45)), 245.0);
        // A zero column means nothing was recorded
        assert_eq!(arena_power(20, Some(0)), 210.0);
        assert_eq!(effective_max_damage(Some(0)), 10);
    }

    #[test]
    fn test_arena_tie_goes_to_player_two() {
        let p1 = Character::new(1, 1, "Alpha", CharacterClass::DarkKnight).at_level(20);
        let p2 = Character::new(2, 2, "Beta", CharacterClass::FairyElf).at_level(20);

        // Identical levels and identical multipliers give equal power
        let outcome = resolve_arena_battle(&p1, &p2, &mut low_rng());
        assert_eq!(outcome.player1_power, outcome.player2_power);
        assert_eq!(outcome.winner_id, 2);
        assert_eq!(outcome.loser_id, 1);
        assert_eq!(outcome.zen_reward, 2000);
        assert_eq!(outcome.exp_reward, 1000);
        assert_eq!(outcome.battle_log, "Beta defeated Alpha in arena combat!");
    }

    #[test]
    fn test_arena_rewards_scale_with_loser_level() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let p1 = Character::new(1, 1, "Alpha", CharacterClass::DarkKnight).at_level(20);
        let p2 = Character::new(2, 2, "Beta", CharacterClass::FairyElf).at_level(25);
        for _ in 0..200 {
            let outcome = resolve_arena_battle(&p1, &p2, &mut rng);
            let loser_level = if outcome.loser_id == 1 { 20 } else { 25 };
            assert!(outcome.zen_reward >= loser_level * 100 && outcome.zen_reward < loser_level * 100 + 500);
            assert!(outcome.exp_reward >= loser_level * 50 && outcome.exp_reward < loser_level * 50 + 200);
            assert!((168..=252).contains(&outcome.player1_power));
            assert!((208..=312).contains(&outcome.player2_power));
            assert_ne!(outcome.winner_id, outcome.loser_id);
        }
    }
}
