//! Character class archetypes.

use serde::{Deserialize, Serialize};

/// Base attribute block a character starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub strength: u32,
    pub agility: u32,
    pub vitality: u32,
    pub energy: u32,
    pub command: u32,
}

/// Character class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    DarkKnight = 0,
    DarkWizard = 1,
    FairyElf = 2,
    MagicGladiator = 3,
    DarkLord = 4,
    Summoner = 5,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 6] = [
        Self::DarkKnight,
        Self::DarkWizard,
        Self::FairyElf,
        Self::MagicGladiator,
        Self::DarkLord,
        Self::Summoner,
    ];

    /// Display name, also the value stored in the `class` column
    pub fn name(&self) -> &'static str {
        match self {
            Self::DarkKnight => "Dark Knight",
            Self::DarkWizard => "Dark Wizard",
            Self::FairyElf => "Fairy Elf",
            Self::MagicGladiator => "Magic Gladiator",
            Self::DarkLord => "Dark Lord",
            Self::Summoner => "Summoner",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DarkKnight => "A powerful warrior skilled in close combat and swordsmanship",
            Self::DarkWizard => "Master of elemental magic and powerful spells",
            Self::FairyElf => "Agile archer with nature magic abilities",
            Self::MagicGladiator => "Hybrid warrior-mage with balanced combat skills",
            Self::DarkLord => "Commander with leadership abilities and pet summoning",
            Self::Summoner => "Mystical spellcaster with curse and support magic",
        }
    }

    /// Starting attributes for a freshly created character
    pub fn base_stats(&self) -> BaseStats {
        let (strength, agility, vitality, energy, command) = match self {
            Self::DarkKnight => (28, 20, 25, 10, 0),
            Self::DarkWizard => (18, 18, 15, 30, 0),
            Self::FairyElf => (22, 25, 20, 15, 0),
            Self::MagicGladiator => (26, 26, 26, 16, 0),
            Self::DarkLord => (26, 20, 20, 15, 25),
            Self::Summoner => (21, 21, 18, 23, 0),
        };
        BaseStats { strength, agility, vitality, energy, command }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names_round_trip() {
        for class in CharacterClass::ALL {
            assert_eq!(CharacterClass::from_name(class.name()), Some(class));
        }
        assert_eq!(CharacterClass::from_name("Necromancer"), None);
    }

    #[test]
    fn test_dark_lord_is_the_only_commander() {
        for class in CharacterClass::ALL {
            let has_command = class.base_stats().command > 0;
            assert_eq!(has_command, class == CharacterClass::DarkLord);
        }
    }
}
