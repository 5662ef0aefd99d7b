//! Maps a [`LogLine`] to a [`CombatEvent`] by fixed parameter offsets.

use arenalog_types::CombatUnitSpec;

use super::*;
use crate::combat_log::{LogLine, Ruleset, Token};
use crate::error::ParseError;
use crate::game_data::class_for_spec;

/// Start of the advanced actor block for melee swings.
const SWING_ADVANCED_OFFSET: usize = 8;
/// Start of the advanced actor block for spell and range events.
const SPELL_ADVANCED_OFFSET: usize = 11;
/// Fields in the advanced actor block ahead of the event's own suffix.
const ADVANCED_BLOCK_LEN: usize = 17;

/// Stat block spans parameters 2..=22.
const STATS_START: usize = 2;
const STATS_LEN: usize = 21;

/// What the classifier needs to know about the current log header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierContext {
    pub ruleset: Ruleset,
    pub advanced_log_enabled: bool,
}

impl Default for ClassifierContext {
    fn default() -> Self {
        Self {
            ruleset: Ruleset::Current,
            advanced_log_enabled: true,
        }
    }
}

/// Classify one tokenized line.
///
/// Returns `UnsupportedEvent` for names outside the lookup and
/// `FieldExtraction` when a required field is missing or mistyped. Callers
/// keep the raw line in both cases.
pub fn classify(line: &LogLine, ctx: &ClassifierContext) -> Result<CombatEvent, ParseError> {
    let event = LogEvent::from_name(&line.event, ctx.ruleset).ok_or_else(|| {
        ParseError::UnsupportedEvent {
            event: line.event.clone(),
        }
    })?;
    let fields = Fields { line };

    let classified = match event {
        LogEvent::ArenaMatchStart => CombatEvent::ArenaMatchStart(ArenaMatchStart {
            timestamp: line.timestamp,
            zone_id: fields.text(0, "zone_id")?,
            item_id: fields.text(1, "item_id")?,
            bracket: fields.text(2, "bracket")?,
            is_ranked: fields.text(3, "is_ranked")? == "1",
        }),
        LogEvent::ArenaMatchEnd => CombatEvent::ArenaMatchEnd(ArenaMatchEnd {
            timestamp: line.timestamp,
            winning_team_id: fields.text(0, "winning_team_id")?,
            duration_secs: fields.int(1, "duration_secs")?,
            team0_rating: fields.int(2, "team0_rating")?,
            team1_rating: fields.int(3, "team1_rating")?,
        }),
        LogEvent::CombatantInfo => CombatEvent::CombatantInfo(combatant_info(&fields, ctx)?),
        e if e.is_damage() || e.is_heal() => {
            let action = base_action(&fields, event)?;
            let offset = advanced_offset(event);
            let (amount_index, advanced) = if ctx.advanced_log_enabled {
                (offset + ADVANCED_BLOCK_LEN, advanced_actor(&fields, offset)?)
            } else {
                (offset, None)
            };
            let amount = fields.int(amount_index, "amount")?;
            CombatEvent::HpUpdate(HpUpdateAction {
                action,
                amount: if event.is_damage() { -amount } else { amount },
                advanced,
            })
        }
        LogEvent::SpellCastSuccess | LogEvent::SpellEnergize | LogEvent::SpellPeriodicEnergize => {
            let action = base_action(&fields, event)?;
            let advanced = if ctx.advanced_log_enabled {
                advanced_actor(&fields, SPELL_ADVANCED_OFFSET)?
            } else {
                None
            };
            CombatEvent::Advanced(AdvancedAction { action, advanced })
        }
        LogEvent::SpellInterrupt
        | LogEvent::SpellStolen
        | LogEvent::SpellDispel
        | LogEvent::SpellDispelFailed => CombatEvent::ExtraSpell(ExtraSpellAction {
            action: base_action(&fields, event)?,
            extra_spell_id: fields.text(11, "extra_spell_id")?,
            extra_spell_name: fields.text(12, "extra_spell_name")?,
        }),
        LogEvent::SpellAbsorbed => CombatEvent::Absorb(absorb_action(&fields, ctx)?),
        LogEvent::UnitDied => {
            let mut action = base_action(&fields, event)?;
            let params = &line.parameters;
            action.unconscious =
                params.len() > 8 && params.last().and_then(Token::as_i64) == Some(1);
            CombatEvent::Action(action)
        }
        _ => CombatEvent::Action(base_action(&fields, event)?),
    };

    Ok(classified)
}

fn advanced_offset(event: LogEvent) -> usize {
    if event.is_swing() {
        SWING_ADVANCED_OFFSET
    } else {
        SPELL_ADVANCED_OFFSET
    }
}

/// Positional accessors that report the failing field.
struct Fields<'a> {
    line: &'a LogLine,
}

impl Fields<'_> {
    fn err(&self, field: &'static str, index: usize) -> ParseError {
        ParseError::FieldExtraction {
            event: self.line.event.clone(),
            field,
            index,
        }
    }

    fn get(&self, index: usize, field: &'static str) -> Result<&Token, ParseError> {
        self.line.param(index).ok_or_else(|| self.err(field, index))
    }

    fn text(&self, index: usize, field: &'static str) -> Result<String, ParseError> {
        self.get(index, field)?
            .to_text()
            .ok_or_else(|| self.err(field, index))
    }

    fn int(&self, index: usize, field: &'static str) -> Result<i64, ParseError> {
        self.get(index, field)?
            .as_i64()
            .ok_or_else(|| self.err(field, index))
    }

    fn float(&self, index: usize, field: &'static str) -> Result<f64, ParseError> {
        self.get(index, field)?
            .as_f64()
            .ok_or_else(|| self.err(field, index))
    }

    fn flags(&self, index: usize, field: &'static str) -> Result<u32, ParseError> {
        self.get(index, field)?
            .as_flags()
            .ok_or_else(|| self.err(field, index))
    }

    fn list(&self, index: usize, field: &'static str) -> Result<Vec<Token>, ParseError> {
        self.get(index, field)?
            .as_list()
            .map(<[Token]>::to_vec)
            .ok_or_else(|| self.err(field, index))
    }

    /// `|`-separated integers, as used by the power fields.
    fn int_series(&self, index: usize, field: &'static str) -> Result<Vec<i64>, ParseError> {
        let text = self.text(index, field)?;
        text.split('|')
            .map(|v| v.trim().parse::<i64>().map_err(|_| self.err(field, index)))
            .collect()
    }
}

fn base_action(fields: &Fields<'_>, event: LogEvent) -> Result<CombatAction, ParseError> {
    let src_id = fields.text(0, "src_id")?;
    let src_name = fields.text(1, "src_name")?;
    let src_flags = fields.flags(2, "src_flags")?;
    let dest_id = fields.text(4, "dest_id")?;
    let dest_name = fields.text(5, "dest_name")?;
    let dest_flags = fields.flags(6, "dest_flags")?;

    let (spell_id, spell_name) = if event.has_spell_prefix() {
        (
            Some(fields.text(8, "spell_id")?),
            Some(fields.text(9, "spell_name")?),
        )
    } else {
        (None, None)
    };

    Ok(CombatAction {
        timestamp: fields.line.timestamp,
        event,
        src_id,
        src_name,
        src_flags,
        dest_id,
        dest_name,
        dest_flags,
        spell_id,
        spell_name,
        unconscious: false,
    })
}

fn advanced_actor(fields: &Fields<'_>, o: usize) -> Result<Option<AdvancedActor>, ParseError> {
    let actor = fields.get(o, "advanced_actor_id")?;
    if actor.is_null_guid() {
        return Ok(None);
    }

    let power_types = fields.int_series(o + 8, "power_type")?;
    let current = fields.int_series(o + 9, "current_power")?;
    let max = fields.int_series(o + 10, "max_power")?;
    if current.len() != power_types.len() || max.len() != power_types.len() {
        return Err(fields.err("power", o + 8));
    }
    let powers = power_types
        .into_iter()
        .zip(current)
        .zip(max)
        .map(|((power_type, current), max)| UnitPower {
            power_type,
            current,
            max,
        })
        .collect();

    Ok(Some(AdvancedActor {
        actor_id: fields.text(o, "advanced_actor_id")?,
        owner_id: fields.text(o + 1, "advanced_owner_id")?,
        current_hp: fields.int(o + 2, "current_hp")?,
        max_hp: fields.int(o + 3, "max_hp")?,
        powers,
        position_x: fields.float(o + 12, "position_x")?,
        position_y: fields.float(o + 13, "position_y")?,
    }))
}

fn absorb_action(fields: &Fields<'_>, ctx: &ClassifierContext) -> Result<AbsorbAction, ParseError> {
    let mut action = base_action(fields, LogEvent::SpellAbsorbed)?;

    // A unit id at 8 means the absorbed attack was a melee swing with no
    // attack spell block.
    let melee = matches!(fields.get(8, "attack")?, Token::Str(_));
    let b = if melee { 8 } else { 11 };
    if melee {
        action.spell_id = None;
        action.spell_name = None;
    }

    let critical = match ctx.ruleset {
        Ruleset::Current => Some(
            fields
                .line
                .param(b + 9)
                .and_then(Token::to_text)
                .is_some_and(|t| t == "1"),
        ),
        Ruleset::Legacy => None,
    };

    Ok(AbsorbAction {
        action,
        shield_owner_id: fields.text(b, "shield_owner_id")?,
        shield_owner_name: fields.text(b + 1, "shield_owner_name")?,
        shield_owner_flags: fields.flags(b + 2, "shield_owner_flags")?,
        shield_spell_id: fields.text(b + 4, "shield_spell_id")?,
        shield_spell_name: fields.text(b + 5, "shield_spell_name")?,
        shield_spell_school: fields.text(b + 6, "shield_spell_school")?,
        absorbed_amount: fields.int(b + 7, "absorbed_amount")?,
        critical,
    })
}

fn combatant_info(fields: &Fields<'_>, ctx: &ClassifierContext) -> Result<CombatantInfo, ParseError> {
    let line = fields.line;

    let mut s = [0i64; STATS_LEN];
    for (i, slot) in s.iter_mut().enumerate() {
        *slot = fields.int(STATS_START + i, "stat")?;
    }
    let stats = CombatantStats {
        strength: s[0],
        agility: s[1],
        stamina: s[2],
        intelligence: s[3],
        dodge: s[4],
        parry: s[5],
        block: s[6],
        crit_melee: s[7],
        crit_ranged: s[8],
        crit_spell: s[9],
        speed: s[10],
        lifesteal: s[11],
        haste_melee: s[12],
        haste_ranged: s[13],
        haste_spell: s[14],
        avoidance: s[15],
        mastery: s[16],
        versatility_damage_done: s[17],
        versatility_healing_done: s[18],
        versatility_damage_taken: s[19],
        armor: s[20],
    };

    // Unknown spec ids still produce the event, with no class
    let spec_id = fields.int(23, "spec_id")?;
    let spec = CombatUnitSpec::from_id(spec_id);
    let class = spec.and_then(class_for_spec);

    let optional_list = |index: usize| {
        line.param(index)
            .and_then(Token::as_list)
            .map(<[Token]>::to_vec)
            .unwrap_or_default()
    };

    let covenant = match (ctx.ruleset, line.param(26).and_then(Token::as_list)) {
        (Ruleset::Current, Some(c)) if c.len() >= 5 => Some(CovenantInfo {
            soulbind_id: c[0].as_i64().unwrap_or_default(),
            covenant_id: c[1].as_i64().unwrap_or_default(),
            item2: c[2].clone(),
            item3: c[3].clone(),
            conduits: c[4].clone(),
        }),
        _ => None,
    };

    let equipment = match line.param(27) {
        Some(_) => fields
            .list(27, "equipment")?
            .iter()
            .map(|item| equipped_item(fields, item))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(CombatantInfo {
        timestamp: line.timestamp,
        unit_id: fields.text(0, "unit_id")?,
        team_id: fields.text(1, "team_id")?,
        stats,
        spec_id,
        spec,
        class,
        talents: optional_list(24),
        pvp_talents: optional_list(25),
        covenant,
        equipment,
        interesting_auras: optional_list(28),
        personal_rating: line.param(31).and_then(Token::as_i64),
        highest_pvp_tier: line.param(32).and_then(Token::as_i64),
    })
}

fn equipped_item(fields: &Fields<'_>, item: &Token) -> Result<EquippedItem, ParseError> {
    let parts = item.as_list().ok_or_else(|| fields.err("equipment", 27))?;
    let part = |i: usize| parts.get(i).cloned().unwrap_or(Token::List(Vec::new()));

    Ok(EquippedItem {
        id: parts
            .first()
            .and_then(Token::to_text)
            .ok_or_else(|| fields.err("item_id", 27))?,
        item_level: parts.get(1).and_then(Token::as_i64).unwrap_or_default(),
        enchants: part(2),
        bonuses: part(3),
        gems: part(4),
    })
}
