//! Per-segment unit: classification evidence plus activity buckets.

use arenalog_types::{CombatUnitClass, CombatUnitReaction, CombatUnitSpec, CombatUnitType};
use serde::Serialize;

use super::evidence::EvidenceTable;
use crate::combat_log::is_null_id;
use crate::events::{AbsorbAction, CombatAction, CombatEvent, CombatantInfo, HpUpdateAction};

#[derive(Debug, Clone, Serialize)]
pub struct CombatUnit {
    pub id: String,
    pub name: String,
    /// First non-sentinel owner claim. Only meaningful for pets.
    pub owner_id: Option<String>,

    pub unit_type: CombatUnitType,
    pub reaction: CombatUnitReaction,
    pub class: CombatUnitClass,
    pub spec: CombatUnitSpec,
    pub info: Option<CombatantInfo>,

    pub is_active: bool,
    pub is_well_formed: bool,
    pub start_time: i64,
    pub end_time: i64,

    // ─── Activity ────────────────────────────────────────────────────────────
    pub damage_in: Vec<HpUpdateAction>,
    pub damage_out: Vec<HpUpdateAction>,
    pub heal_in: Vec<HpUpdateAction>,
    pub heal_out: Vec<HpUpdateAction>,
    /// Absorbs that prevented damage to this unit.
    pub absorbs_in: Vec<AbsorbAction>,
    /// Absorbs from shields this unit cast.
    pub absorbs_out: Vec<AbsorbAction>,
    /// This unit's attacks that hit a shield instead of health.
    pub absorbs_damaged: Vec<AbsorbAction>,
    pub action_in: Vec<CombatEvent>,
    pub action_out: Vec<CombatEvent>,
    pub aura_events: Vec<CombatEvent>,
    pub spell_cast_events: Vec<CombatEvent>,
    pub death_records: Vec<CombatAction>,
    pub conscious_death_records: Vec<CombatAction>,
    pub advanced_actions: Vec<CombatEvent>,

    // ─── Evidence ────────────────────────────────────────────────────────────
    #[serde(skip)]
    type_votes: EvidenceTable<CombatUnitType>,
    #[serde(skip)]
    reaction_votes: EvidenceTable<CombatUnitReaction>,
    #[serde(skip)]
    class_votes: EvidenceTable<CombatUnitClass>,
}

impl CombatUnit {
    pub fn new(id: &str, name: &str, timestamp: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            owner_id: None,
            unit_type: CombatUnitType::None,
            reaction: CombatUnitReaction::Neutral,
            class: CombatUnitClass::None,
            spec: CombatUnitSpec::None,
            info: None,
            is_active: false,
            is_well_formed: false,
            start_time: timestamp,
            end_time: timestamp,
            damage_in: Vec::new(),
            damage_out: Vec::new(),
            heal_in: Vec::new(),
            heal_out: Vec::new(),
            absorbs_in: Vec::new(),
            absorbs_out: Vec::new(),
            absorbs_damaged: Vec::new(),
            action_in: Vec::new(),
            action_out: Vec::new(),
            aura_events: Vec::new(),
            spell_cast_events: Vec::new(),
            death_records: Vec::new(),
            conscious_death_records: Vec::new(),
            advanced_actions: Vec::new(),
            type_votes: EvidenceTable::default(),
            reaction_votes: EvidenceTable::default(),
            class_votes: EvidenceTable::default(),
        }
    }

    pub fn prove_type(&mut self, unit_type: CombatUnitType) {
        self.type_votes.vote(unit_type);
    }

    pub fn prove_reaction(&mut self, reaction: CombatUnitReaction) {
        self.reaction_votes.vote(reaction);
    }

    pub fn prove_class(&mut self, class: CombatUnitClass) {
        self.class_votes.vote(class);
    }

    /// Record an owner claim. The first valid claim sticks.
    pub fn prove_owner(&mut self, owner_id: &str) {
        if self.owner_id.is_none() && !is_null_id(owner_id) && owner_id != self.id {
            self.owner_id = Some(owner_id.to_string());
        }
    }

    pub fn type_votes(&self) -> &EvidenceTable<CombatUnitType> {
        &self.type_votes
    }

    pub fn reaction_votes(&self) -> &EvidenceTable<CombatUnitReaction> {
        &self.reaction_votes
    }

    /// Events counted toward activity.
    pub fn activity_count(&self) -> usize {
        self.damage_in.len()
            + self.damage_out.len()
            + self.heal_in.len()
            + self.heal_out.len()
            + self.action_in.len()
            + self.action_out.len()
    }

    /// Mark the unit active when it has enough events over a long enough
    /// lifespan. Both bounds are exclusive.
    pub fn end_activity(&mut self, min_events: usize, min_duration_ms: i64) {
        self.is_active = self.activity_count() > min_events
            && self.end_time - self.start_time > min_duration_ms;
    }

    /// Resolve type, reaction and class from their vote tables.
    pub fn resolve(&mut self) {
        if let Some(t) = self.type_votes.leader() {
            self.unit_type = t;
        }
        if let Some(r) = self.reaction_votes.leader() {
            self.reaction = r;
        }
        if let Some(c) = self.class_votes.leader() {
            self.class = c;
        }

        self.is_well_formed = self.class != CombatUnitClass::None
            && self.unit_type != CombatUnitType::None
            && self.reaction != CombatUnitReaction::Neutral
            && self.is_active;
    }

    /// Timestamp of the most recent death record.
    pub fn last_death(&self) -> Option<i64> {
        self.death_records.iter().map(|d| d.timestamp).max()
    }
}
