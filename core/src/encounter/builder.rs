//! Replays a closed segment into units and decides what kind of record it is.
//!
//! Units are created on first reference and vote on their own type and
//! reaction from the flag fields of every line they appear in. Combatant info
//! is kept aside and applied once the segment is complete.

use std::collections::BTreeMap;

use arenalog_types::{
    CombatResult, CombatUnitClass, CombatUnitReaction, CombatUnitSpec, CombatUnitType,
    ParserConfig,
};
use hashbrown::HashMap;

use super::record::{ArenaMatch, MalformedMatch, MatchRecord, compute_match_id};
use super::unit::CombatUnit;
use crate::combat_log::{Ruleset, is_null_id};
use crate::events::{ArenaMatchEnd, ArenaMatchStart, CombatEvent, CombatantInfo, LogEvent};
use crate::game_data::{reaction_from_flags, unit_type_from_flags};
use crate::segmenter::{CloseReason, Segment};

/// Ground-truth classification from a `COMBATANT_INFO` line.
#[derive(Debug, Clone)]
struct CombatantMetadata {
    spec: CombatUnitSpec,
    class: CombatUnitClass,
    info: CombatantInfo,
}

#[derive(Debug)]
pub struct MatchBuilder {
    ruleset: Ruleset,
    min_active_event_count: usize,
    min_active_duration_ms: i64,

    units: Vec<CombatUnit>,
    index: HashMap<String, usize>,
    metadata: HashMap<String, CombatantMetadata>,

    start_info: Option<ArenaMatchStart>,
    end_info: Option<ArenaMatchEnd>,
    start_time: Option<i64>,
    end_time: i64,
    has_advanced_logging: bool,
}

impl MatchBuilder {
    pub fn new(ruleset: Ruleset, config: &ParserConfig) -> Self {
        Self {
            ruleset,
            min_active_event_count: config.min_active_event_count,
            min_active_duration_ms: config.min_active_duration_ms,
            units: Vec::new(),
            index: HashMap::new(),
            metadata: HashMap::new(),
            start_info: None,
            end_info: None,
            start_time: None,
            end_time: 0,
            has_advanced_logging: false,
        }
    }

    pub fn unit(&self, id: &str) -> Option<&CombatUnit> {
        self.index.get(id).map(|&i| &self.units[i])
    }

    /// Units in first-seen order.
    pub fn units(&self) -> &[CombatUnit] {
        &self.units
    }

    pub fn has_advanced_logging(&self) -> bool {
        self.has_advanced_logging
    }

    /// Look up or create a unit. Sentinel ids never become units.
    fn unit_index(&mut self, id: &str, name: &str, timestamp: i64) -> Option<usize> {
        if is_null_id(id) {
            return None;
        }
        if let Some(&i) = self.index.get(id) {
            return Some(i);
        }
        let i = self.units.len();
        self.units.push(CombatUnit::new(id, name, timestamp));
        self.index.insert(id.to_string(), i);
        Some(i)
    }

    /// Reference a unit from an action: create it, extend its lifespan and
    /// record one type vote and one reaction vote from its flags.
    fn touch(&mut self, id: &str, name: &str, flags: u32, timestamp: i64) -> Option<usize> {
        let i = self.unit_index(id, name, timestamp)?;
        let unit = &mut self.units[i];
        unit.end_time = timestamp;
        unit.prove_type(unit_type_from_flags(flags));
        unit.prove_reaction(reaction_from_flags(flags));
        Some(i)
    }

    pub fn read_event(&mut self, event: &CombatEvent) {
        let timestamp = event.timestamp();
        self.start_time.get_or_insert(timestamp);
        self.end_time = timestamp;

        let action = match event {
            CombatEvent::ArenaMatchStart(start) => {
                self.start_info = Some(start.clone());
                return;
            }
            CombatEvent::ArenaMatchEnd(end) => {
                self.end_info = Some(end.clone());
                return;
            }
            CombatEvent::CombatantInfo(info) => {
                self.register_combatant(info);
                return;
            }
            _ => match event.action() {
                Some(action) => action,
                None => return,
            },
        };

        let src = self.touch(&action.src_id, &action.src_name, action.src_flags, timestamp);
        let dest = self.touch(&action.dest_id, &action.dest_name, action.dest_flags, timestamp);

        match (action.event, event) {
            (LogEvent::SwingDamageLanded, _) => {}
            (e, CombatEvent::HpUpdate(hp)) if e.is_damage() => {
                // Self-damage only counts as incoming
                if let Some(s) = src.filter(|_| action.src_id != action.dest_id) {
                    self.units[s].damage_out.push(hp.clone());
                }
                if let Some(d) = dest {
                    self.units[d].damage_in.push(hp.clone());
                }
                self.record_advanced(event, true);
            }
            (e, CombatEvent::HpUpdate(hp)) if e.is_heal() => {
                if let Some(s) = src {
                    self.units[s].heal_out.push(hp.clone());
                }
                if let Some(d) = dest {
                    self.units[d].heal_in.push(hp.clone());
                }
                self.record_advanced(event, true);
            }
            (e, _) if e.is_aura() => {
                if let Some(d) = dest {
                    self.units[d].aura_events.push(event.clone());
                }
            }
            (
                LogEvent::SpellInterrupt
                | LogEvent::SpellStolen
                | LogEvent::SpellDispel
                | LogEvent::SpellDispelFailed
                | LogEvent::SpellExtraAttacks,
                _,
            ) => {
                if let Some(s) = src {
                    self.units[s].action_out.push(event.clone());
                }
                if let Some(d) = dest {
                    self.units[d].action_in.push(event.clone());
                }
            }
            (LogEvent::UnitDied, _) => {
                if let Some(d) = dest {
                    let unit = &mut self.units[d];
                    if action.unconscious {
                        unit.conscious_death_records.push(action.clone());
                    } else {
                        unit.death_records.push(action.clone());
                    }
                }
            }
            (LogEvent::SpellCastSuccess, _) => {
                self.record_advanced(event, false);
                if let Some(s) = src {
                    self.units[s].spell_cast_events.push(event.clone());
                }
            }
            (LogEvent::SpellCastStart | LogEvent::SpellCastFailed, _) => {
                if let Some(s) = src {
                    self.units[s].spell_cast_events.push(event.clone());
                }
            }
            (LogEvent::SpellSummon, _) => {
                if let Some(s) = src {
                    self.units[s].action_out.push(event.clone());
                }
                if let Some(d) = dest {
                    self.units[d].prove_owner(&action.src_id);
                }
            }
            (LogEvent::SpellAbsorbed, CombatEvent::Absorb(absorb)) => {
                if let Some(d) = dest {
                    self.units[d].absorbs_in.push(absorb.clone());
                }
                if let Some(s) = src {
                    self.units[s].absorbs_damaged.push(absorb.clone());
                }
                if let Some(o) =
                    self.unit_index(&absorb.shield_owner_id, &absorb.shield_owner_name, timestamp)
                {
                    self.units[o].absorbs_out.push(absorb.clone());
                }
            }
            _ => {}
        }
    }

    /// Attach an event to its advanced actor, if that unit already exists.
    fn record_advanced(&mut self, event: &CombatEvent, claims_owner: bool) {
        let Some(advanced) = event.advanced() else {
            return;
        };
        self.has_advanced_logging = true;

        let Some(&i) = self.index.get(advanced.actor_id.as_str()) else {
            return;
        };
        let actor = &mut self.units[i];
        actor.advanced_actions.push(event.clone());
        if claims_owner {
            actor.prove_owner(&advanced.owner_id);
        }
    }

    fn register_combatant(&mut self, info: &CombatantInfo) {
        let (Some(spec), Some(class)) = (info.spec, info.class) else {
            tracing::debug!(
                unit_id = %info.unit_id,
                spec_id = info.spec_id,
                "[MATCH] combatant with unknown spec"
            );
            return;
        };
        self.metadata.insert(
            info.unit_id.clone(),
            CombatantMetadata {
                spec,
                class,
                info: info.clone(),
            },
        );
    }

    /// Resolve every unit and fold pet output into owners.
    pub fn end(&mut self) {
        for unit in &mut self.units {
            unit.end_activity(self.min_active_event_count, self.min_active_duration_ms);
            if let Some(meta) = self.metadata.get(&unit.id) {
                unit.info = Some(meta.info.clone());
                unit.prove_class(meta.class);
                unit.spec = meta.spec;
            }
            unit.resolve();
        }

        self.merge_pets();
    }

    /// Append each owned non-player unit's outgoing damage, healing and
    /// actions to its owner, then re-sort the owner's buckets by time.
    /// Contributions are taken from the pre-merge buckets.
    fn merge_pets(&mut self) {
        let merges: Vec<(usize, usize)> = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.unit_type != CombatUnitType::Player)
            .filter_map(|(pet, u)| {
                let owner = *self.index.get(u.owner_id.as_deref()?)?;
                (owner != pet).then_some((owner, pet))
            })
            .collect();

        let contributions: Vec<_> = merges
            .iter()
            .map(|&(owner, pet)| {
                let p = &self.units[pet];
                (
                    owner,
                    p.damage_out.clone(),
                    p.heal_out.clone(),
                    p.action_out.clone(),
                )
            })
            .collect();

        for (owner, damage, heal, actions) in contributions {
            let owner = &mut self.units[owner];
            owner.damage_out.extend(damage);
            owner.damage_out.sort_by_key(|a| a.action.timestamp);
            owner.heal_out.extend(heal);
            owner.heal_out.sort_by_key(|a| a.action.timestamp);
            owner.action_out.extend(actions);
            owner.action_out.sort_by_key(CombatEvent::timestamp);
        }
    }

    /// Team id of the first friendly unit that has combatant info.
    pub fn player_team_id(&self) -> Option<String> {
        self.units
            .iter()
            .filter(|u| u.reaction == CombatUnitReaction::Friendly)
            .find_map(|u| self.metadata.get(&u.id))
            .map(|m| m.info.team_id.clone())
    }

    /// Match outcome from the player team's point of view. Call after
    /// [`MatchBuilder::end`].
    pub fn result(&self) -> CombatResult {
        match self.ruleset {
            Ruleset::Current => {
                let player_team = self.player_team_id();
                let (Some(end), Some(team)) = (&self.end_info, player_team.as_deref()) else {
                    return CombatResult::Unknown;
                };
                match end.winning_team_id.as_str() {
                    winner if winner == team => CombatResult::Win,
                    "0" | "1" => CombatResult::Lose,
                    _ => CombatResult::Draw,
                }
            }
            Ruleset::Legacy => {
                let last_dead = self
                    .units
                    .iter()
                    .filter(|u| u.unit_type == CombatUnitType::Player)
                    .filter_map(|u| u.last_death().map(|t| (t, u)))
                    .max_by_key(|(t, _)| *t)
                    .map(|(_, u)| u);
                match last_dead.map(|u| u.reaction) {
                    Some(CombatUnitReaction::Friendly) => CombatResult::Lose,
                    Some(CombatUnitReaction::Hostile) => CombatResult::Win,
                    _ => CombatResult::Unknown,
                }
            }
        }
    }

    /// `2v2`, `3v3` or `5v5` from the larger of the two player teams.
    fn inferred_bracket(&self) -> &'static str {
        let team_size = |reaction: CombatUnitReaction| {
            self.units
                .iter()
                .filter(|u| u.unit_type == CombatUnitType::Player && u.reaction == reaction)
                .count()
        };
        let biggest = team_size(CombatUnitReaction::Friendly).max(team_size(CombatUnitReaction::Hostile));
        match biggest {
            0..=2 => "2v2",
            3 => "3v3",
            _ => "5v5",
        }
    }

    /// Resolve the segment and produce its record.
    pub fn finish(mut self, segment: Segment) -> MatchRecord {
        self.end();

        let id = compute_match_id(&segment.lines);
        let unparsed_line_count = segment.unparsed_line_count();
        let start_time = self.start_time.unwrap_or_else(|| segment.start_time());

        let player_team_id = self.player_team_id();
        let result = self.result();

        let player_count = self
            .units
            .iter()
            .filter(|u| u.unit_type == CombatUnitType::Player)
            .count();
        let dead_players = self
            .units
            .iter()
            .filter(|u| u.unit_type == CombatUnitType::Player && !u.death_records.is_empty())
            .count();
        let combatants = self.metadata.len();

        let rejection = if player_count != combatants {
            Some("player count does not match combatant info")
        } else if dead_players == 0 {
            Some("no deaths")
        } else if segment.close_reason == CloseReason::IdleTimeout {
            Some("idle timeout")
        } else if self.start_info.is_none() || self.end_info.is_none() {
            Some("missing match boundary")
        } else if dead_players >= combatants {
            Some("every combatant died")
        } else if !matches!(result, CombatResult::Win | CombatResult::Lose) {
            Some("no decisive result")
        } else {
            None
        };

        let (Some(mut start_info), Some(end_info), None) =
            (self.start_info.take(), self.end_info.take(), rejection)
        else {
            tracing::warn!(
                match_id = %id,
                reason = rejection.unwrap_or("missing match boundary"),
                close_reason = ?segment.close_reason,
                lines = segment.lines.len(),
                "[MATCH] malformed"
            );
            return MatchRecord::Malformed(MalformedMatch {
                id,
                start_time,
                raw_lines: segment.lines,
                unparsed_line_count,
                close_reason: segment.close_reason,
            });
        };

        if self.ruleset == Ruleset::Legacy && start_info.bracket.is_empty() {
            start_info.bracket = self.inferred_bracket().to_string();
        }

        let player_team_id = player_team_id.unwrap_or_default();
        let player_team_rating = match player_team_id.as_str() {
            "0" => end_info.team0_rating,
            "1" => end_info.team1_rating,
            _ => 0,
        };

        let end_time = self.end_time;
        let has_advanced_logging = self.has_advanced_logging;
        let units: BTreeMap<String, CombatUnit> = self
            .units
            .into_iter()
            .filter(|u| u.is_well_formed)
            .map(|u| (u.id.clone(), u))
            .collect();

        MatchRecord::WellFormed(ArenaMatch {
            id,
            ruleset: self.ruleset,
            start_time,
            end_time,
            units,
            player_team_id,
            player_team_rating,
            result,
            has_advanced_logging,
            raw_lines: segment.lines,
            unparsed_line_count,
            start_info,
            end_info,
        })
    }
}

/// Replay a closed segment and build its record.
pub fn build_match(segment: Segment, ruleset: Ruleset, config: &ParserConfig) -> MatchRecord {
    let mut builder = MatchBuilder::new(ruleset, config);
    for event in &segment.events {
        builder.read_event(event);
    }
    builder.finish(segment)
}
