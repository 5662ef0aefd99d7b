//! Static game tables: spec to class, and unit flag decoding.

use arenalog_types::{CombatUnitClass, CombatUnitReaction, CombatUnitSpec, CombatUnitType};
use phf::phf_map;

const UNIT_TYPE_MASK: u32 = 0x0000_fc00;
const UNIT_TYPE_PET: u32 = 0x0000_1000;
const UNIT_TYPE_PLAYER: u32 = 0x0000_0400;

const REACTION_MASK: u32 = 0x0000_00f0;
const REACTION_HOSTILE: u32 = 0x0000_0040;
const REACTION_FRIENDLY: u32 = 0x0000_0010;

static SPEC_CLASS: phf::Map<u32, CombatUnitClass> = phf_map! {
    250u32 => CombatUnitClass::DeathKnight,
    251u32 => CombatUnitClass::DeathKnight,
    252u32 => CombatUnitClass::DeathKnight,
    577u32 => CombatUnitClass::DemonHunter,
    581u32 => CombatUnitClass::DemonHunter,
    102u32 => CombatUnitClass::Druid,
    103u32 => CombatUnitClass::Druid,
    104u32 => CombatUnitClass::Druid,
    105u32 => CombatUnitClass::Druid,
    253u32 => CombatUnitClass::Hunter,
    254u32 => CombatUnitClass::Hunter,
    255u32 => CombatUnitClass::Hunter,
    62u32 => CombatUnitClass::Mage,
    63u32 => CombatUnitClass::Mage,
    64u32 => CombatUnitClass::Mage,
    268u32 => CombatUnitClass::Monk,
    269u32 => CombatUnitClass::Monk,
    270u32 => CombatUnitClass::Monk,
    65u32 => CombatUnitClass::Paladin,
    66u32 => CombatUnitClass::Paladin,
    70u32 => CombatUnitClass::Paladin,
    256u32 => CombatUnitClass::Priest,
    257u32 => CombatUnitClass::Priest,
    258u32 => CombatUnitClass::Priest,
    259u32 => CombatUnitClass::Rogue,
    260u32 => CombatUnitClass::Rogue,
    261u32 => CombatUnitClass::Rogue,
    262u32 => CombatUnitClass::Shaman,
    263u32 => CombatUnitClass::Shaman,
    264u32 => CombatUnitClass::Shaman,
    265u32 => CombatUnitClass::Warlock,
    266u32 => CombatUnitClass::Warlock,
    267u32 => CombatUnitClass::Warlock,
    71u32 => CombatUnitClass::Warrior,
    72u32 => CombatUnitClass::Warrior,
    73u32 => CombatUnitClass::Warrior,
};

/// Class for a known spec. `None` for `CombatUnitSpec::None`.
pub fn class_for_spec(spec: CombatUnitSpec) -> Option<CombatUnitClass> {
    SPEC_CLASS.get(&spec.id()).copied()
}

pub fn unit_type_from_flags(flags: u32) -> CombatUnitType {
    match flags & UNIT_TYPE_MASK {
        UNIT_TYPE_PET => CombatUnitType::Pet,
        UNIT_TYPE_PLAYER => CombatUnitType::Player,
        _ => CombatUnitType::None,
    }
}

pub fn reaction_from_flags(flags: u32) -> CombatUnitReaction {
    match flags & REACTION_MASK {
        REACTION_HOSTILE => CombatUnitReaction::Hostile,
        REACTION_FRIENDLY => CombatUnitReaction::Friendly,
        _ => CombatUnitReaction::Neutral,
    }
}
