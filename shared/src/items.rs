//! Item catalog shared between client and server.

use serde::{Deserialize, Serialize};

/// Item archetype (immutable catalog entry)
#[derive(Debug, Clone, Serialize)]
pub struct ItemArchetype {
    pub name: &'static str,
    pub kind: ItemKind,
    pub slot: EquipSlot,
    /// Damage range for weapons and pendants
    pub damage: Option<(u32, u32)>,
    pub defense: Option<u32>,
    pub requirements: Requirements,
    /// Free-form tag text ("Chaos Weapon, +Luck", "Ancient Item, ...")
    pub special: Option<&'static str>,
}

/// Prerequisites for equipping an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub level: u32,
    pub strength: u32,
    pub agility: u32,
    pub energy: u32,
}

/// Item types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon,
    Sword,
    Axe,
    Bow,
    Staff,
    Armor,
    Helm,
    Pants,
    Gloves,
    Boots,
    Shield,
    Ring,
    Pendant,
    Wings,
}

/// Equipment slot an item occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Helm,
    Pants,
    Gloves,
    Boots,
    Shield,
    Ring,
    Pendant,
    Wings,
}

impl EquipSlot {
    /// Column value used by the `items.slot` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Helm => "helm",
            Self::Pants => "pants",
            Self::Gloves => "gloves",
            Self::Boots => "boots",
            Self::Shield => "shield",
            Self::Ring => "ring1",
            Self::Pendant => "pendant",
            Self::Wings => "wings",
        }
    }
}

/// Item rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl ItemRarity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

impl ItemArchetype {
    /// Display rarity derived from catalog metadata.
    ///
    /// Tags win over level: an Ancient item is legendary and a Chaos item is
    /// epic whatever their level requirement.
    pub fn rarity(&self) -> ItemRarity {
        let special = self.special.unwrap_or("");
        if special.contains("Ancient") {
            ItemRarity::Legendary
        } else if special.contains("Chaos") {
            ItemRarity::Epic
        } else if self.requirements.level > 200 {
            ItemRarity::Rare
        } else if self.requirements.level > 100 {
            ItemRarity::Uncommon
        } else {
            ItemRarity::Common
        }
    }
}

/// Look up an item archetype by name
pub fn item(name: &str) -> Option<&'static ItemArchetype> {
    ITEMS.iter().find(|i| i.name == name)
}

/// Rarity of a named item; names missing from the catalog are common
pub fn rarity_of(name: &str) -> ItemRarity {
    item(name).map(ItemArchetype::rarity).unwrap_or(ItemRarity::Common)
}

const fn req(level: u32, strength: u32, agility: u32, energy: u32) -> Requirements {
    Requirements { level, strength, agility, energy }
}

const fn weapon(
    name: &'static str,
    kind: ItemKind,
    slot: EquipSlot,
    damage: (u32, u32),
    requirements: Requirements,
    special: Option<&'static str>,
) -> ItemArchetype {
    ItemArchetype { name, kind, slot, damage: Some(damage), defense: None, requirements, special }
}

const fn armor(
    name: &'static str,
    kind: ItemKind,
    slot: EquipSlot,
    defense: u32,
    requirements: Requirements,
    special: Option<&'static str>,
) -> ItemArchetype {
    ItemArchetype { name, kind, slot, damage: None, defense: Some(defense), requirements, special }
}

// Every droppable item that has catalog data, plus the Chaos and Ancient sets.
pub static ITEMS: &[ItemArchetype] = &[
    weapon("Short Sword", ItemKind::Weapon, EquipSlot::Weapon, (1, 4), req(1, 18, 0, 0), None),
    armor("Leather Helm", ItemKind::Helm, EquipSlot::Helm, 2, req(1, 18, 0, 0), None),
    armor("Leather Armor", ItemKind::Armor, EquipSlot::Armor, 4, req(1, 18, 0, 0), None),
    armor("Bronze Armor", ItemKind::Armor, EquipSlot::Armor, 8, req(15, 60, 0, 0), None),
    weapon("Rapier", ItemKind::Weapon, EquipSlot::Weapon, (4, 9), req(8, 40, 25, 0), None),
    armor("Pad Armor", ItemKind::Armor, EquipSlot::Armor, 12, req(25, 80, 0, 0), None),
    weapon("Blade", ItemKind::Weapon, EquipSlot::Weapon, (12, 19), req(35, 120, 0, 0), None),
    armor("Bone Armor", ItemKind::Armor, EquipSlot::Armor, 18, req(40, 140, 0, 0), None),
    weapon("Short Bow", ItemKind::Weapon, EquipSlot::Weapon, (1, 4), req(1, 0, 20, 0), None),
    armor("Leather Gloves", ItemKind::Gloves, EquipSlot::Gloves, 1, req(1, 18, 0, 0), None),
    armor("Scale Armor", ItemKind::Armor, EquipSlot::Armor, 14, req(30, 110, 0, 0), None),
    weapon("Serpent Spear", ItemKind::Weapon, EquipSlot::Weapon, (22, 32), req(50, 150, 60, 0), None),
    armor("Bronze Boots", ItemKind::Boots, EquipSlot::Boots, 3, req(15, 60, 0, 0), None),
    weapon("Legendary Staff", ItemKind::Weapon, EquipSlot::Weapon, (15, 23), req(50, 0, 0, 170), None),
    armor("Pad Helm", ItemKind::Helm, EquipSlot::Helm, 6, req(25, 80, 0, 0), None),
    weapon("Knight Blade", ItemKind::Weapon, EquipSlot::Weapon, (85, 92), req(195, 500, 0, 0), None),
    weapon("Lightning Sword", ItemKind::Weapon, EquipSlot::Weapon, (35, 42), req(105, 295, 0, 0), None),
    armor("Vine Armor", ItemKind::Armor, EquipSlot::Armor, 6, req(10, 0, 0, 40), None),
    armor("Bone Helm", ItemKind::Helm, EquipSlot::Helm, 9, req(40, 140, 0, 0), None),
    weapon("Elven Bow", ItemKind::Weapon, EquipSlot::Weapon, (6, 11), req(20, 0, 80, 0), None),
    armor("Leather Boots", ItemKind::Boots, EquipSlot::Boots, 1, req(1, 18, 0, 0), None),
    armor("Vine Gloves", ItemKind::Gloves, EquipSlot::Gloves, 2, req(10, 0, 0, 40), None),
    weapon("Giant Trident", ItemKind::Weapon, EquipSlot::Weapon, (15, 25), req(30, 100, 40, 0), None),
    armor("Bronze Shield", ItemKind::Shield, EquipSlot::Shield, 50, req(180, 380, 0, 0), None),
    armor("Scale Gloves", ItemKind::Gloves, EquipSlot::Gloves, 5, req(30, 110, 0, 0), None),
    weapon("Dark Breaker", ItemKind::Weapon, EquipSlot::Weapon, (95, 102), req(210, 530, 0, 0), None),
    armor("Dragon Armor", ItemKind::Armor, EquipSlot::Armor, 28, req(60, 210, 0, 0), None),
    weapon("Giant Sword", ItemKind::Weapon, EquipSlot::Weapon, (40, 47), req(115, 320, 0, 0), None),
    armor("Guardian Armor", ItemKind::Armor, EquipSlot::Armor, 22, req(70, 0, 0, 200), None),
    weapon("Lightning Staff", ItemKind::Weapon, EquipSlot::Weapon, (9, 15), req(30, 0, 0, 110), None),
    weapon("Legendary Sword", ItemKind::Sword, EquipSlot::Weapon, (70, 120), req(380, 0, 0, 0), Some("Ancient Item, +20 All Stats")),
    weapon("Chaos Dragon Axe", ItemKind::Axe, EquipSlot::Weapon, (55, 90), req(300, 0, 0, 0), Some("Chaos Weapon, +Luck")),
    weapon("Chaos Nature Bow", ItemKind::Bow, EquipSlot::Weapon, (45, 75), req(300, 0, 0, 0), Some("Chaos Weapon, +Luck")),
    weapon("Chaos Lightning Staff", ItemKind::Staff, EquipSlot::Weapon, (40, 80), req(300, 0, 0, 0), Some("Chaos Weapon, +Energy")),
    armor("Chaos Dragon Helm", ItemKind::Helm, EquipSlot::Helm, 25, req(300, 0, 0, 0), Some("Chaos Armor, +Luck")),
    armor("Chaos Dragon Armor", ItemKind::Armor, EquipSlot::Armor, 35, req(300, 0, 0, 0), Some("Chaos Armor, +Luck")),
    armor("Chaos Dragon Pants", ItemKind::Pants, EquipSlot::Pants, 20, req(300, 0, 0, 0), Some("Chaos Armor, +Luck")),
    armor("Chaos Dragon Gloves", ItemKind::Gloves, EquipSlot::Gloves, 12, req(300, 0, 0, 0), Some("Chaos Armor, +Luck")),
    armor("Chaos Dragon Boots", ItemKind::Boots, EquipSlot::Boots, 15, req(300, 0, 0, 0), Some("Chaos Armor, +Luck")),
    weapon("Ancient Blade", ItemKind::Sword, EquipSlot::Weapon, (65, 115), req(350, 0, 0, 0), Some("Ancient Item, +15 All Stats")),
    armor("Guardian Angel", ItemKind::Armor, EquipSlot::Armor, 40, req(380, 0, 0, 0), Some("Ancient Armor, +20 Defense")),
    armor("Sacred Gloves", ItemKind::Gloves, EquipSlot::Gloves, 18, req(350, 0, 0, 0), Some("Ancient Gloves, +15 Agility")),
    armor("Sacred Boots", ItemKind::Boots, EquipSlot::Boots, 20, req(350, 0, 0, 0), Some("Ancient Boots, +15 Agility")),
    armor("Small Shield", ItemKind::Shield, EquipSlot::Shield, 3, req(1, 20, 0, 0), None),
    armor("Kite Shield", ItemKind::Shield, EquipSlot::Shield, 10, req(30, 80, 0, 0), None),
    armor("Ring of Magic", ItemKind::Ring, EquipSlot::Ring, 4, req(40, 0, 0, 0), Some("+20 Mana")),
    weapon("Pendant of Ability", ItemKind::Pendant, EquipSlot::Pendant, (0, 8), req(40, 0, 0, 0), Some("+10 All Stats")),
    armor("Wings of Elf", ItemKind::Wings, EquipSlot::Wings, 5, req(200, 0, 0, 0), Some("+50 Agility, Flight")),
    armor("Wings of Satan", ItemKind::Wings, EquipSlot::Wings, 10, req(400, 0, 0, 0), Some("+50 All Stats, Flight")),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn archetype(level: u32, special: Option<&'static str>) -> ItemArchetype {
        armor("Test Item", ItemKind::Armor, EquipSlot::Armor, 1, req(level, 0, 0, 0), special)
    }

    #[test]
    fn test_rarity_tags_take_precedence() {
        assert_eq!(archetype(300, Some("Chaos Weapon, +Luck")).rarity(), ItemRarity::Epic);
        assert_eq!(archetype(380, Some("Ancient Item, +20 All Stats")).rarity(), ItemRarity::Legendary);
        assert_eq!(archetype(50, None).rarity(), ItemRarity::Common);
    }

    #[test]
    fn test_rarity_level_thresholds() {
        assert_eq!(archetype(100, None).rarity(), ItemRarity::Common);
        assert_eq!(archetype(101, None).rarity(), ItemRarity::Uncommon);
        assert_eq!(archetype(200, None).rarity(), ItemRarity::Uncommon);
        assert_eq!(archetype(201, Some("Flight")).rarity(), ItemRarity::Rare);
    }

    #[test]
    fn test_catalog_rarities() {
        assert_eq!(rarity_of("Chaos Dragon Axe"), ItemRarity::Epic);
        assert_eq!(rarity_of("Legendary Sword"), ItemRarity::Legendary);
        assert_eq!(rarity_of("Dark Breaker"), ItemRarity::Rare);
        assert_eq!(rarity_of("Lightning Sword"), ItemRarity::Uncommon);
        assert_eq!(rarity_of("Short Sword"), ItemRarity::Common);
        assert_eq!(rarity_of("Legendary Sword").name(), "legendary");
        // Drop table entries without catalog data
        assert_eq!(rarity_of("Chain Lightning"), ItemRarity::Common);
    }

    #[test]
    fn test_catalog_names_are_unique() {
        for (i, a) in ITEMS.iter().enumerate() {
            assert!(ITEMS[i + 1..].iter().all(|b| b.name != a.name), "duplicate {}", a.name);
            assert!(a.damage.is_some() != a.defense.is_some());
        }
    }
}
