//! Static map and monster catalogs.
//!
//! Read-only reference data. Maps list monsters by name; names resolve
//! through [`monster`].

use serde::Serialize;

/// Hunting ground definition
#[derive(Debug, Clone, Serialize)]
pub struct MapDef {
    pub name: &'static str,
    /// Recommended level range (inclusive)
    pub level_range: (u32, u32),
    /// Whether player killing is disabled on this map
    pub safe_zone: bool,
    pub zone_type: &'static str,
    pub description: &'static str,
    pub monsters: &'static [&'static str],
}

/// Monster archetype
#[derive(Debug, Clone, Serialize)]
pub struct MonsterDef {
    pub name: &'static str,
    pub hp: u32,
    pub exp: u64,
    pub zen: u64,
    /// Minimum level at which this monster shows up in a hunt
    pub level: u32,
    /// Item names this monster can drop
    pub drops: &'static [&'static str],
}

const fn monster(
    name: &'static str,
    hp: u32,
    exp: u64,
    zen: u64,
    level: u32,
    drops: &'static [&'static str],
) -> MonsterDef {
    MonsterDef { name, hp, exp, zen, level, drops }
}

/// Map every new character starts on
pub const STARTING_MAP: &str = "Lorencia";

/// Look up a map by name
pub fn map(name: &str) -> Option<&'static MapDef> {
    MAPS.iter().find(|m| m.name == name)
}

/// Look up a monster by name
pub fn monster_by_name(name: &str) -> Option<&'static MonsterDef> {
    MONSTERS.iter().find(|m| m.name == name)
}

impl MapDef {
    /// Resolve this map's monster names into archetypes, skipping unknown names
    pub fn monster_defs(&self) -> impl Iterator<Item = &'static MonsterDef> + '_ {
        self.monsters.iter().filter_map(|name| monster_by_name(name))
    }
}

pub static MAPS: &[MapDef] = &[
    MapDef {
        name: "Lorencia",
        level_range: (1, 50),
        safe_zone: true,
        zone_type: "Beginner Zone",
        description: "Peaceful grasslands perfect for new warriors",
        monsters: &["Goblin", "Orc", "Skeleton", "Spider", "Elite Orc", "Orc Archer"],
    },
    MapDef {
        name: "Noria",
        level_range: (20, 80),
        safe_zone: true,
        zone_type: "Intermediate Zone",
        description: "Desert town with mysterious creatures",
        monsters: &["Budge Dragon", "Mutant", "Ghost", "Death Knight", "Larva", "Hell Hound"],
    },
    MapDef {
        name: "Devias",
        level_range: (40, 120),
        safe_zone: true,
        zone_type: "Advanced Zone",
        description: "Forest highlands with dangerous beasts",
        monsters: &["Yeti", "Elite Orc", "Forest Orc", "Red Skeleton", "Satyr", "Cyclops"],
    },
    MapDef {
        name: "Dungeon",
        level_range: (50, 150),
        safe_zone: false,
        zone_type: "Dungeon",
        description: "Dark underground labyrinth",
        monsters: &["Cyclops", "Hell Hound", "Poison Bull", "Thunder Lich", "Dark Knight", "Gorgon"],
    },
    MapDef {
        name: "Atlans",
        level_range: (80, 200),
        safe_zone: false,
        zone_type: "High Level Zone",
        description: "Underwater city of ancient technology",
        monsters: &["Tantalos", "Beam Knight", "Mutant Captain", "Death Beam Knight", "Metal Balrog", "Gorgon"],
    },
    MapDef {
        name: "Tarkan",
        level_range: (100, 250),
        safe_zone: false,
        zone_type: "Expert Zone",
        description: "Volcanic wasteland of fire and stone",
        monsters: &["Lizard King", "Fire Golem", "Queen Bee", "Poison Golem", "Metal Balrog", "Dragon"],
    },
    MapDef {
        name: "Ice Wind Valley",
        level_range: (120, 280),
        safe_zone: false,
        zone_type: "Master Zone",
        description: "Frozen valley with ancient ice magic",
        monsters: &["Ice Giant", "Coolutin", "Iron Wheel", "Gigantis", "Yeti", "Ice Queen"],
    },
    MapDef {
        name: "Vulcanus",
        level_range: (150, 320),
        safe_zone: false,
        zone_type: "Hell Zone",
        description: "Hellish realm of fire and death",
        monsters: &["Death Centurion", "Necron", "Schriker", "Illusion of Kundun", "Death Angel", "Balrog"],
    },
    MapDef {
        name: "Karutan",
        level_range: (180, 350),
        safe_zone: false,
        zone_type: "Ancient Zone",
        description: "Ancient temple ruins with powerful guardians",
        monsters: &["Condra", "Narcondra", "Crypta", "Crypos", "Death Angel", "Hydra"],
    },
    MapDef {
        name: "Aida",
        level_range: (200, 380),
        safe_zone: false,
        zone_type: "Dimensional Zone",
        description: "Mystical dimension of magic and illusion",
        monsters: &["Maya Left Hand", "Maya Right Hand", "Persona", "Doppelganger", "Aegis", "Rohan"],
    },
    MapDef {
        name: "Crywolf",
        level_range: (250, 400),
        safe_zone: false,
        zone_type: "Siege Zone",
        description: "Fortress under siege by dark forces",
        monsters: &["Balgass", "Death Spirit", "Soram", "Dark Elf", "Balram", "Wolf Soul"],
    },
    MapDef {
        name: "Kanturu",
        level_range: (300, 450),
        safe_zone: false,
        zone_type: "Nightmare Zone",
        description: "Nightmare realm of twisted creatures",
        monsters: &["Berserker", "Splinter Wolf", "Iron Rider", "Satyros", "Blade Hunter", "Nightmare"],
    },
    MapDef {
        name: "Raklion",
        level_range: (350, 500),
        safe_zone: false,
        zone_type: "Dragon Zone",
        description: "Dragon territory with ancient wyrms",
        monsters: &["Selupan", "Perseos", "Drakan", "Great Drakan", "Gigantis", "Ice Napin"],
    },
    MapDef {
        name: "Swamp of Peace",
        level_range: (400, 550),
        safe_zone: false,
        zone_type: "Corrupted Zone",
        description: "Corrupted wetlands of dark magic",
        monsters: &["Orc Fighter", "Orc Lancer", "Ghost Napin", "Blaze Napin", "Thunder Napin", "Shadow Master"],
    },
    MapDef {
        name: "Silent Map",
        level_range: (450, 600),
        safe_zone: false,
        zone_type: "Void Zone",
        description: "Void dimension where sound itself dies",
        monsters: &["Silion", "Weapon Silion", "Armor Silion", "Golem Silion", "Berserker Silion", "Shadow Phantom"],
    },
];

pub static MONSTERS: &[MonsterDef] = &[
    monster("Goblin", 30, 15, 3, 5, &["Short Sword", "Leather Helm"]),
    monster("Orc", 80, 35, 8, 12, &["Chain Lightning", "Leather Armor"]),
    monster("Skeleton", 120, 50, 12, 18, &["Kris", "Bronze Armor"]),
    monster("Spider", 150, 70, 15, 25, &["Rapier", "Pad Armor"]),
    monster("Elite Orc", 200, 95, 20, 30, &["Blade", "Bone Armor"]),
    monster("Orc Archer", 180, 85, 18, 28, &["Short Bow", "Leather Gloves"]),
    monster("Budge Dragon", 300, 150, 35, 40, &["Dragon Blade", "Scale Armor"]),
    monster("Mutant", 450, 220, 50, 55, &["Serpent Spear", "Bronze Boots"]),
    monster("Ghost", 600, 300, 70, 70, &["Legendary Staff", "Pad Helm"]),
    monster("Death Knight", 800, 400, 95, 85, &["Knight Blade", "Knight Armor"]),
    monster("Larva", 350, 175, 40, 45, &["Lightning Sword", "Vine Armor"]),
    monster("Hell Hound", 750, 375, 85, 80, &["Salamander Shield", "Bone Helm"]),
    monster("Yeti", 1200, 600, 140, 100, &["Ice Blade", "Scale Mail"]),
    monster("Forest Orc", 1000, 500, 120, 90, &["Elven Bow", "Leather Boots"]),
    monster("Red Skeleton", 1100, 550, 130, 95, &["Crystal Sword", "Bone Armor"]),
    monster("Satyr", 1350, 675, 155, 105, &["Horn of Fenrir", "Vine Gloves"]),
    monster("Cyclops", 2500, 1200, 280, 140, &["Giant Trident", "Bronze Shield"]),
    monster("Poison Bull", 2000, 1000, 230, 120, &["Poison Sword", "Scale Gloves"]),
    monster("Thunder Lich", 2200, 1100, 250, 130, &["Thunder Staff", "Pad Shield"]),
    monster("Dark Knight", 2800, 1400, 320, 150, &["Dark Breaker", "Dark Armor"]),
    monster("Gorgon", 3200, 1600, 370, 160, &["Medusa Shield", "Stone Armor"]),
    monster("Tantalos", 5000, 2500, 600, 200, &["Atlantis Staff", "Neptune Armor"]),
    monster("Beam Knight", 4500, 2250, 550, 190, &["Beam Sword", "Crystal Armor"]),
    monster("Mutant Captain", 5500, 2750, 650, 210, &["Captain Blade", "War Armor"]),
    monster("Death Beam Knight", 6000, 3000, 700, 220, &["Death Beam", "Phantom Armor"]),
    monster("Metal Balrog", 7000, 3500, 800, 240, &["Balrog Mace", "Metal Shield"]),
    monster("Lizard King", 8000, 4000, 950, 250, &["Lizard Scale Shield", "Dragon Armor"]),
    monster("Fire Golem", 9000, 4500, 1100, 270, &["Fire Sword", "Magma Armor"]),
    monster("Queen Bee", 7500, 3750, 900, 245, &["Sting Sword", "Honey Armor"]),
    monster("Poison Golem", 8500, 4250, 1000, 260, &["Poison Mace", "Toxic Shield"]),
    monster("Dragon", 12000, 6000, 1500, 300, &["Dragon Slayer", "Dragon Scale Mail"]),
    monster("Ice Giant", 15000, 7500, 1800, 320, &["Frost Mourne", "Ice Crystal Armor"]),
    monster("Coolutin", 13000, 6500, 1600, 310, &["Ice Scepter", "Frozen Shield"]),
    monster("Iron Wheel", 14000, 7000, 1700, 315, &["Iron Wheel Shield", "Mechanic Armor"]),
    monster("Gigantis", 18000, 9000, 2200, 350, &["Giant Sword", "Titan Armor"]),
    monster("Ice Queen", 25000, 12500, 3000, 400, &["Ice Queen Staff", "Crystal Crown"]),
    monster("Death Centurion", 20000, 10000, 2500, 380, &["Centurion Spear", "Legion Armor"]),
    monster("Necron", 22000, 11000, 2700, 390, &["Necron Mace", "Death Armor"]),
    monster("Schriker", 24000, 12000, 2900, 395, &["Schriker Axe", "Berserker Mail"]),
    monster("Illusion of Kundun", 30000, 15000, 3600, 420, &["Kundun Staff", "Illusion Robe"]),
    monster("Death Angel", 28000, 14000, 3400, 410, &["Angel Blade", "Seraph Wings"]),
    monster("Balrog", 35000, 17500, 4200, 450, &["Balrog Blade", "Demon Armor"]),
    monster("Condra", 32000, 16000, 3800, 430, &["Condra Staff", "Maya Helm"]),
    monster("Narcondra", 34000, 17000, 4000, 440, &["Narcondra Bow", "Maya Armor"]),
    monster("Crypta", 36000, 18000, 4300, 460, &["Crypta Sword", "Ancient Shield"]),
    monster("Crypos", 38000, 19000, 4500, 470, &["Crypos Mace", "Temple Armor"]),
    monster("Hydra", 45000, 22500, 5400, 500, &["Hydra Bow", "Multi-Head Helm"]),
    monster("Maya Left Hand", 40000, 20000, 4800, 480, &["Maya Left Hand", "Mystical Armor"]),
    monster("Maya Right Hand", 42000, 21000, 5000, 490, &["Maya Right Hand", "Divine Shield"]),
    monster("Persona", 44000, 22000, 5200, 495, &["Persona Mask", "Soul Armor"]),
    monster("Doppelganger", 46000, 23000, 5500, 505, &["Mirror Blade", "Reflection Mail"]),
    monster("Aegis", 48000, 24000, 5800, 510, &["Aegis Shield", "Guardian Armor"]),
    monster("Rohan", 50000, 25000, 6000, 520, &["Rohan Spear", "Royal Armor"]),
    monster("Balgass", 55000, 27500, 6600, 540, &["Balgass Axe", "Wolf Armor"]),
    monster("Death Spirit", 52000, 26000, 6200, 530, &["Spirit Sword", "Ghost Mail"]),
    monster("Soram", 58000, 29000, 7000, 550, &["Soram Blade", "War Chief Armor"]),
    monster("Dark Elf", 53000, 26500, 6400, 535, &["Elf Bow", "Shadow Cloak"]),
    monster("Balram", 60000, 30000, 7200, 560, &["Balram Mace", "Fortress Shield"]),
    monster("Wolf Soul", 65000, 32500, 7800, 580, &["Soul Blade", "Alpha Armor"]),
    monster("Berserker", 70000, 35000, 8400, 600, &["Berserker Axe", "Rage Armor"]),
    monster("Splinter Wolf", 68000, 34000, 8100, 590, &["Wolf Claw", "Pack Leader Mail"]),
    monster("Iron Rider", 72000, 36000, 8600, 610, &["Iron Lance", "Cavalry Armor"]),
    monster("Satyros", 75000, 37500, 9000, 620, &["Horn Spear", "Beast Armor"]),
    monster("Blade Hunter", 78000, 39000, 9400, 635, &["Hunter Blade", "Stalker Mail"]),
    monster("Nightmare", 85000, 42500, 10200, 650, &["Nightmare Sword", "Dream Armor"]),
    monster("Selupan", 90000, 45000, 10800, 670, &["Selupan Staff", "Dragon Scale Shield"]),
    monster("Perseos", 88000, 44000, 10500, 660, &["Perseos Blade", "Wyvern Armor"]),
    monster("Drakan", 95000, 47500, 11400, 690, &["Drakan Claw", "Drake Mail"]),
    monster("Great Drakan", 120000, 60000, 14400, 750, &["Great Dragon Sword", "Ancient Dragon Armor"]),
    monster("Ice Napin", 85000, 42500, 10200, 650, &["Ice Crystal Staff", "Frozen Mail"]),
    monster("Orc Fighter", 100000, 50000, 12000, 720, &["War Hammer", "Battle Armor"]),
    monster("Orc Lancer", 105000, 52500, 12600, 740, &["Battle Lance", "Spike Armor"]),
    monster("Ghost Napin", 98000, 49000, 11800, 710, &["Ghost Staff", "Spectral Robes"]),
    monster("Blaze Napin", 110000, 55000, 13200, 760, &["Fire Staff", "Flame Armor"]),
    monster("Thunder Napin", 108000, 54000, 12900, 750, &["Lightning Staff", "Storm Mail"]),
    monster("Shadow Master", 125000, 62500, 15000, 800, &["Shadow Blade", "Master Armor"]),
    monster("Silion", 130000, 65000, 15600, 820, &["Silence Sword", "Void Armor"]),
    monster("Weapon Silion", 135000, 67500, 16200, 840, &["Weapon Silion", "Arsenal Mail"]),
    monster("Armor Silion", 140000, 70000, 16800, 860, &["Armor Silion", "Fortress Shield"]),
    monster("Golem Silion", 150000, 75000, 18000, 900, &["Golem Core", "Stone Giant Armor"]),
    monster("Berserker Silion", 160000, 80000, 19200, 950, &["Berserker Silion", "Rage Incarnate Mail"]),
    monster("Shadow Phantom", 200000, 100000, 24000, 1000, &["Phantom Blade", "Ethereal Armor"]),
];
