use serde::{Deserialize, Serialize};

/// Unit kind decoded from the type bits of a unit flag field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatUnitType {
    #[default]
    None,
    Player,
    Pet,
}

/// Unit disposition relative to the logging player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatUnitReaction {
    #[default]
    Neutral,
    Friendly,
    Hostile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatResult {
    #[default]
    Unknown,
    Win,
    Lose,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatUnitClass {
    #[default]
    None,
    DeathKnight,
    DemonHunter,
    Druid,
    Hunter,
    Mage,
    Monk,
    Paladin,
    Priest,
    Rogue,
    Shaman,
    Warlock,
    Warrior,
}

/// Specialization, keyed by the numeric spec id the client logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatUnitSpec {
    #[default]
    None,
    DeathKnightBlood,
    DeathKnightFrost,
    DeathKnightUnholy,
    DemonHunterHavoc,
    DemonHunterVengeance,
    DruidBalance,
    DruidFeral,
    DruidGuardian,
    DruidRestoration,
    HunterBeastMastery,
    HunterMarksmanship,
    HunterSurvival,
    MageArcane,
    MageFire,
    MageFrost,
    MonkBrewmaster,
    MonkWindwalker,
    MonkMistweaver,
    PaladinHoly,
    PaladinProtection,
    PaladinRetribution,
    PriestDiscipline,
    PriestHoly,
    PriestShadow,
    RogueAssassination,
    RogueOutlaw,
    RogueSubtlety,
    ShamanElemental,
    ShamanEnhancement,
    ShamanRestoration,
    WarlockAffliction,
    WarlockDemonology,
    WarlockDestruction,
    WarriorArms,
    WarriorFury,
    WarriorProtection,
}

impl CombatUnitSpec {
    /// Look up a spec by its logged id. Unknown ids (including 0) yield `None`.
    pub fn from_id(id: i64) -> Option<Self> {
        let spec = match id {
            250 => Self::DeathKnightBlood,
            251 => Self::DeathKnightFrost,
            252 => Self::DeathKnightUnholy,
            577 => Self::DemonHunterHavoc,
            581 => Self::DemonHunterVengeance,
            102 => Self::DruidBalance,
            103 => Self::DruidFeral,
            104 => Self::DruidGuardian,
            105 => Self::DruidRestoration,
            253 => Self::HunterBeastMastery,
            254 => Self::HunterMarksmanship,
            255 => Self::HunterSurvival,
            62 => Self::MageArcane,
            63 => Self::MageFire,
            64 => Self::MageFrost,
            268 => Self::MonkBrewmaster,
            269 => Self::MonkWindwalker,
            270 => Self::MonkMistweaver,
            65 => Self::PaladinHoly,
            66 => Self::PaladinProtection,
            70 => Self::PaladinRetribution,
            256 => Self::PriestDiscipline,
            257 => Self::PriestHoly,
            258 => Self::PriestShadow,
            259 => Self::RogueAssassination,
            260 => Self::RogueOutlaw,
            261 => Self::RogueSubtlety,
            262 => Self::ShamanElemental,
            263 => Self::ShamanEnhancement,
            264 => Self::ShamanRestoration,
            265 => Self::WarlockAffliction,
            266 => Self::WarlockDemonology,
            267 => Self::WarlockDestruction,
            71 => Self::WarriorArms,
            72 => Self::WarriorFury,
            73 => Self::WarriorProtection,
            _ => return None,
        };
        Some(spec)
    }

    /// The logged id for this spec, 0 for `None`.
    pub fn id(self) -> u32 {
        match self {
            Self::None => 0,
            Self::DeathKnightBlood => 250,
            Self::DeathKnightFrost => 251,
            Self::DeathKnightUnholy => 252,
            Self::DemonHunterHavoc => 577,
            Self::DemonHunterVengeance => 581,
            Self::DruidBalance => 102,
            Self::DruidFeral => 103,
            Self::DruidGuardian => 104,
            Self::DruidRestoration => 105,
            Self::HunterBeastMastery => 253,
            Self::HunterMarksmanship => 254,
            Self::HunterSurvival => 255,
            Self::MageArcane => 62,
            Self::MageFire => 63,
            Self::MageFrost => 64,
            Self::MonkBrewmaster => 268,
            Self::MonkWindwalker => 269,
            Self::MonkMistweaver => 270,
            Self::PaladinHoly => 65,
            Self::PaladinProtection => 66,
            Self::PaladinRetribution => 70,
            Self::PriestDiscipline => 256,
            Self::PriestHoly => 257,
            Self::PriestShadow => 258,
            Self::RogueAssassination => 259,
            Self::RogueOutlaw => 260,
            Self::RogueSubtlety => 261,
            Self::ShamanElemental => 262,
            Self::ShamanEnhancement => 263,
            Self::ShamanRestoration => 264,
            Self::WarlockAffliction => 265,
            Self::WarlockDemonology => 266,
            Self::WarlockDestruction => 267,
            Self::WarriorArms => 71,
            Self::WarriorFury => 72,
            Self::WarriorProtection => 73,
        }
    }
}
