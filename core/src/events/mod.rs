//! Typed combat events.
//!
//! Every classified line becomes one [`CombatEvent`]. Action variants share the
//! [`CombatAction`] base (source, destination, spell) and add their own payload.

mod classifier;

use arenalog_types::{CombatUnitClass, CombatUnitSpec};
use phf::phf_map;
use serde::Serialize;

use crate::combat_log::{Ruleset, Token};

pub use classifier::{ClassifierContext, classify};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogEvent {
    ArenaMatchStart,
    ArenaMatchEnd,
    CombatantInfo,
    SwingDamage,
    SwingDamageLanded,
    RangeDamage,
    SpellDamage,
    SpellPeriodicDamage,
    SpellHeal,
    SpellPeriodicHeal,
    SpellAbsorbed,
    SpellAuraApplied,
    SpellAuraAppliedDose,
    SpellAuraRefresh,
    SpellAuraRemoved,
    SpellAuraRemovedDose,
    SpellAuraBroken,
    SpellAuraBrokenSpell,
    SpellInterrupt,
    SpellStolen,
    SpellDispel,
    SpellDispelFailed,
    SpellExtraAttacks,
    SpellCastStart,
    SpellCastSuccess,
    SpellCastFailed,
    SpellSummon,
    SpellEnergize,
    SpellPeriodicEnergize,
    UnitDied,
}

static LOG_EVENTS: phf::Map<&'static str, LogEvent> = phf_map! {
    "ARENA_MATCH_START" => LogEvent::ArenaMatchStart,
    "ARENA_MATCH_END" => LogEvent::ArenaMatchEnd,
    "COMBATANT_INFO" => LogEvent::CombatantInfo,
    "SWING_DAMAGE" => LogEvent::SwingDamage,
    "SWING_DAMAGE_LANDED" => LogEvent::SwingDamageLanded,
    "RANGE_DAMAGE" => LogEvent::RangeDamage,
    "SPELL_DAMAGE" => LogEvent::SpellDamage,
    "SPELL_PERIODIC_DAMAGE" => LogEvent::SpellPeriodicDamage,
    "SPELL_HEAL" => LogEvent::SpellHeal,
    "SPELL_PERIODIC_HEAL" => LogEvent::SpellPeriodicHeal,
    "SPELL_ABSORBED" => LogEvent::SpellAbsorbed,
    "SPELL_AURA_APPLIED" => LogEvent::SpellAuraApplied,
    "SPELL_AURA_APPLIED_DOSE" => LogEvent::SpellAuraAppliedDose,
    "SPELL_AURA_REFRESH" => LogEvent::SpellAuraRefresh,
    "SPELL_AURA_REMOVED" => LogEvent::SpellAuraRemoved,
    "SPELL_AURA_REMOVED_DOSE" => LogEvent::SpellAuraRemovedDose,
    "SPELL_AURA_BROKEN" => LogEvent::SpellAuraBroken,
    "SPELL_AURA_BROKEN_SPELL" => LogEvent::SpellAuraBrokenSpell,
    "SPELL_INTERRUPT" => LogEvent::SpellInterrupt,
    "SPELL_STOLEN" => LogEvent::SpellStolen,
    "SPELL_DISPEL" => LogEvent::SpellDispel,
    "SPELL_DISPEL_FAILED" => LogEvent::SpellDispelFailed,
    "SPELL_EXTRA_ATTACKS" => LogEvent::SpellExtraAttacks,
    "SPELL_CAST_START" => LogEvent::SpellCastStart,
    "SPELL_CAST_SUCCESS" => LogEvent::SpellCastSuccess,
    "SPELL_CAST_FAILED" => LogEvent::SpellCastFailed,
    "SPELL_SUMMON" => LogEvent::SpellSummon,
    "SPELL_ENERGIZE" => LogEvent::SpellEnergize,
    "SPELL_PERIODIC_ENERGIZE" => LogEvent::SpellPeriodicEnergize,
    "UNIT_DIED" => LogEvent::UnitDied,
};

impl LogEvent {
    /// Look up an event name under a rule set.
    pub fn from_name(name: &str, ruleset: Ruleset) -> Option<Self> {
        let event = LOG_EVENTS.get(name).copied()?;
        match (ruleset, event) {
            (Ruleset::Legacy, LogEvent::SwingDamageLanded) => None,
            _ => Some(event),
        }
    }

    /// Melee swing events carry no spell block, so their later fields sit
    /// three positions earlier.
    pub fn is_swing(self) -> bool {
        matches!(self, LogEvent::SwingDamage | LogEvent::SwingDamageLanded)
    }

    pub fn is_damage(self) -> bool {
        matches!(
            self,
            LogEvent::SwingDamage
                | LogEvent::SwingDamageLanded
                | LogEvent::RangeDamage
                | LogEvent::SpellDamage
                | LogEvent::SpellPeriodicDamage
        )
    }

    pub fn is_heal(self) -> bool {
        matches!(self, LogEvent::SpellHeal | LogEvent::SpellPeriodicHeal)
    }

    pub fn is_aura(self) -> bool {
        matches!(
            self,
            LogEvent::SpellAuraApplied
                | LogEvent::SpellAuraAppliedDose
                | LogEvent::SpellAuraRefresh
                | LogEvent::SpellAuraRemoved
                | LogEvent::SpellAuraRemovedDose
                | LogEvent::SpellAuraBroken
                | LogEvent::SpellAuraBrokenSpell
        )
    }

    /// Events whose parameters 8 and 9 hold a spell id and name.
    pub fn has_spell_prefix(self) -> bool {
        !matches!(
            self,
            LogEvent::SwingDamage
                | LogEvent::SwingDamageLanded
                | LogEvent::UnitDied
                | LogEvent::ArenaMatchStart
                | LogEvent::ArenaMatchEnd
                | LogEvent::CombatantInfo
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Arena boundaries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArenaMatchStart {
    pub timestamp: i64,
    pub zone_id: String,
    pub item_id: String,
    pub bracket: String,
    pub is_ranked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArenaMatchEnd {
    pub timestamp: i64,
    pub winning_team_id: String,
    pub duration_secs: i64,
    pub team0_rating: i64,
    pub team1_rating: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Combatant info
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CombatantStats {
    pub strength: i64,
    pub agility: i64,
    pub stamina: i64,
    pub intelligence: i64,
    pub dodge: i64,
    pub parry: i64,
    pub block: i64,
    pub crit_melee: i64,
    pub crit_ranged: i64,
    pub crit_spell: i64,
    pub speed: i64,
    pub lifesteal: i64,
    pub haste_melee: i64,
    pub haste_ranged: i64,
    pub haste_spell: i64,
    pub avoidance: i64,
    pub mastery: i64,
    pub versatility_damage_done: i64,
    pub versatility_healing_done: i64,
    pub versatility_damage_taken: i64,
    pub armor: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovenantInfo {
    pub soulbind_id: i64,
    pub covenant_id: i64,
    pub item2: Token,
    pub item3: Token,
    pub conduits: Token,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquippedItem {
    pub id: String,
    pub item_level: i64,
    pub enchants: Token,
    pub bonuses: Token,
    pub gems: Token,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatantInfo {
    pub timestamp: i64,
    pub unit_id: String,
    pub team_id: String,
    pub stats: CombatantStats,
    pub spec_id: i64,
    /// `None` when the logged spec id is not a known spec.
    pub spec: Option<CombatUnitSpec>,
    pub class: Option<CombatUnitClass>,
    pub talents: Vec<Token>,
    pub pvp_talents: Vec<Token>,
    pub covenant: Option<CovenantInfo>,
    pub equipment: Vec<EquippedItem>,
    pub interesting_auras: Vec<Token>,
    pub personal_rating: Option<i64>,
    pub highest_pvp_tier: Option<i64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// Fields shared by every source/destination event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatAction {
    pub timestamp: i64,
    pub event: LogEvent,
    pub src_id: String,
    pub src_name: String,
    pub src_flags: u32,
    pub dest_id: String,
    pub dest_name: String,
    pub dest_flags: u32,
    pub spell_id: Option<String>,
    pub spell_name: Option<String>,
    /// `UNIT_DIED` only: trailing flag set when the unit was incapacitated
    /// rather than killed outright.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unconscious: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitPower {
    pub power_type: i64,
    pub current: i64,
    pub max: i64,
}

/// Live snapshot of the acting unit, present when advanced logging is on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedActor {
    pub actor_id: String,
    pub owner_id: String,
    pub current_hp: i64,
    pub max_hp: i64,
    pub powers: Vec<UnitPower>,
    pub position_x: f64,
    pub position_y: f64,
}

/// Damage or heal. `amount` is negative for damage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HpUpdateAction {
    #[serde(flatten)]
    pub action: CombatAction,
    pub amount: i64,
    pub advanced: Option<AdvancedActor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedAction {
    #[serde(flatten)]
    pub action: CombatAction,
    pub advanced: Option<AdvancedActor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtraSpellAction {
    #[serde(flatten)]
    pub action: CombatAction,
    pub extra_spell_id: String,
    pub extra_spell_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsorbAction {
    #[serde(flatten)]
    pub action: CombatAction,
    pub absorbed_amount: i64,
    pub shield_owner_id: String,
    pub shield_owner_name: String,
    pub shield_owner_flags: u32,
    pub shield_spell_id: String,
    pub shield_spell_name: String,
    pub shield_spell_school: String,
    /// Only logged by current-ruleset clients.
    pub critical: Option<bool>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Event sum type
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum CombatEvent {
    ArenaMatchStart(ArenaMatchStart),
    ArenaMatchEnd(ArenaMatchEnd),
    CombatantInfo(CombatantInfo),
    Action(CombatAction),
    HpUpdate(HpUpdateAction),
    Advanced(AdvancedAction),
    ExtraSpell(ExtraSpellAction),
    Absorb(AbsorbAction),
}

impl CombatEvent {
    pub fn timestamp(&self) -> i64 {
        match self {
            CombatEvent::ArenaMatchStart(e) => e.timestamp,
            CombatEvent::ArenaMatchEnd(e) => e.timestamp,
            CombatEvent::CombatantInfo(e) => e.timestamp,
            other => other.action().map_or(0, |a| a.timestamp),
        }
    }

    /// Shared action base, `None` for boundary and combatant events.
    pub fn action(&self) -> Option<&CombatAction> {
        match self {
            CombatEvent::Action(a) => Some(a),
            CombatEvent::HpUpdate(e) => Some(&e.action),
            CombatEvent::Advanced(e) => Some(&e.action),
            CombatEvent::ExtraSpell(e) => Some(&e.action),
            CombatEvent::Absorb(e) => Some(&e.action),
            CombatEvent::ArenaMatchStart(_)
            | CombatEvent::ArenaMatchEnd(_)
            | CombatEvent::CombatantInfo(_) => None,
        }
    }

    pub fn advanced(&self) -> Option<&AdvancedActor> {
        match self {
            CombatEvent::HpUpdate(e) => e.advanced.as_ref(),
            CombatEvent::Advanced(e) => e.advanced.as_ref(),
            _ => None,
        }
    }

    pub fn is_match_start(&self) -> bool {
        matches!(self, CombatEvent::ArenaMatchStart(_))
    }

    pub fn is_match_end(&self) -> bool {
        matches!(self, CombatEvent::ArenaMatchEnd(_))
    }
}
