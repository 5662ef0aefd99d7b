//! End-to-end tests: raw lines in, match records out.

use arenalog_types::{CombatResult, ParserConfig};

use super::ParsingSession;
use crate::combat_log::Ruleset;
use crate::encounter::MatchRecord;
use crate::segmenter::CloseReason;
use crate::test_lines::*;

fn session() -> ParsingSession {
    ParsingSession::new(ParserConfig {
        anchor_year: Some(YEAR),
        ..ParserConfig::default()
    })
}

/// Push every line, then flush. Returns every record emitted along the way.
fn run(session: &mut ParsingSession, lines: &[String]) -> Vec<MatchRecord> {
    let mut records: Vec<MatchRecord> = lines.iter().filter_map(|l| session.push_line(l)).collect();
    records.extend(session.flush());
    records
}

#[test]
fn test_scenario_yields_one_well_formed_match() {
    let mut session = session();
    let lines = scenario(T0, 1);

    let emitted: Vec<_> = lines.iter().filter_map(|l| session.push_line(l)).collect();
    assert_eq!(emitted.len(), 1);
    assert!(session.flush().is_none());

    let MatchRecord::WellFormed(m) = &emitted[0] else {
        panic!("expected well-formed match");
    };
    assert_eq!(m.result, CombatResult::Win);
    assert_eq!(m.raw_lines, lines);
    assert_eq!(m.units.len(), 4);
}

#[test]
fn test_idle_timeout_yields_one_malformed_match() {
    let mut session = session();
    let lines = vec![
        match_start(T0),
        spell_damage(T0 + 500, &ALLY_1, &ENEMY_1, 100),
        spell_damage(T0 + 61_500, &ENEMY_2, &ALLY_2, 100),
        spell_heal(T0 + 62_000, &ENEMY_2, &ENEMY_1, 100),
    ];
    let records = run(&mut session, &lines);

    assert_eq!(records.len(), 1);
    let MatchRecord::Malformed(m) = &records[0] else {
        panic!("expected malformed match");
    };
    assert_eq!(m.close_reason, CloseReason::IdleTimeout);
    assert_eq!(m.start_time, T0);
    assert_eq!(m.raw_lines, lines[..2].to_vec());
}

#[test]
fn test_double_start_yields_two_records_first_malformed() {
    let mut session = session();
    let mut lines = vec![
        match_start(T0),
        spell_damage(T0 + 1000, &ALLY_1, &ENEMY_1, 100),
    ];
    lines.extend(scenario(T0 + 5000, 1));
    let records = run(&mut session, &lines);

    assert_eq!(records.len(), 2);
    let MatchRecord::Malformed(first) = &records[0] else {
        panic!("first record should be malformed");
    };
    assert_eq!(first.close_reason, CloseReason::NextMatchStart);
    assert_eq!(first.raw_lines.len(), 2);
    assert!(records[1].is_well_formed());
}

#[test]
fn test_replaying_raw_lines_reproduces_match_id() {
    let mut first = session();
    let records = run(&mut first, &scenario(T0, 0));
    assert_eq!(records.len(), 1);
    let original = &records[0];
    assert!(original.is_well_formed());

    let mut replay = session();
    let replayed = run(&mut replay, original.raw_lines());
    assert_eq!(replayed.len(), 1);
    assert_eq!(replayed[0].id(), original.id());
}

#[test]
fn test_start_times_are_non_decreasing() {
    let mut session = session();
    let mut lines = scenario(T0, 1);
    lines.push(match_start(T0 + 20_000));
    lines.push(spell_damage(T0 + 20_500, &ALLY_1, &ENEMY_1, 10));
    lines.extend(scenario(T0 + 120_000, 0));
    lines.push(match_start(T0 + 400_000));

    let records = run(&mut session, &lines);
    assert_eq!(records.len(), 4);
    let starts: Vec<i64> = records.iter().map(MatchRecord::start_time).collect();
    assert!(starts.windows(2).all(|w| w[0] <= w[1]), "{starts:?}");
}

#[test]
fn test_verbatim_repeat_dropped_but_variant_kept() {
    let lines = scenario(T0, 1);
    let baseline = run(&mut session(), &lines);

    let mut doubled = lines.clone();
    doubled.insert(6, lines[5].clone());
    let deduped = run(&mut session(), &doubled);
    assert_eq!(deduped.len(), 1);
    assert_eq!(deduped[0].id(), baseline[0].id());
    assert_eq!(deduped[0].raw_lines(), lines.as_slice());

    let mut varied = lines.clone();
    varied.insert(6, format!("{} ", lines[5]));
    let kept = run(&mut session(), &varied);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].raw_lines().len(), lines.len() + 1);
    assert_ne!(kept[0].id(), baseline[0].id());
}

#[test]
fn test_repeat_separated_by_blank_line_is_kept() {
    let mut session = session();
    let hit = spell_damage(T0 + 500, &ALLY_1, &ENEMY_1, 100);
    let lines = vec![match_start(T0), hit.clone(), String::new(), hit.clone()];
    let records = run(&mut session, &lines);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].raw_lines(), &[match_start(T0), hit.clone(), hit][..]);
}

#[test]
fn test_unparsed_and_unclassified_lines_are_retained() {
    let mut lines = scenario(T0, 1);
    lines.insert(7, "this is not a combat log line".to_string());
    lines.insert(
        8,
        format!("{}  SPELL_MISSED,{},{},585,\"Smite\",0x2,DODGE,nil", stamp(T0 + 1500), unit_fields(&ALLY_1), unit_fields(&ENEMY_1)),
    );

    let records = run(&mut session(), &lines);
    assert_eq!(records.len(), 1);
    let MatchRecord::WellFormed(m) = &records[0] else {
        panic!("expected well-formed match");
    };
    assert_eq!(m.unparsed_line_count, 2);
    assert_eq!(m.raw_lines, lines);
}

#[test]
fn test_blank_lines_ignored() {
    let mut session = session();
    assert!(session.push_line("").is_none());
    assert!(session.push_line("   \r\n").is_none());

    let lines = scenario(T0, 1);
    let mut with_blanks = Vec::new();
    for line in &lines {
        with_blanks.push(line.clone());
        with_blanks.push(String::new());
    }
    let records = run(&mut session, &with_blanks);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].raw_lines(), lines.as_slice());
}

#[test]
fn test_version_line_flushes_and_switches_rules() {
    let mut session = session();
    let mut lines = scenario(T0, 1);
    lines.pop();
    for line in &lines {
        assert!(session.push_line(line).is_none());
    }

    let record = session
        .push_line("8/20 22:12:00.000  COMBAT_LOG_VERSION,9,ADVANCED_LOG_ENABLED,0,BUILD_VERSION,2.5.1,PROJECT_ID,5")
        .expect("version change closes the open segment");
    let MatchRecord::Malformed(m) = record else {
        panic!("segment without an end is malformed");
    };
    assert_eq!(m.close_reason, CloseReason::VersionChange);
    assert_eq!(session.ruleset(), Ruleset::Legacy);
    assert!(!session.log_version().advanced_log_enabled);
    assert!(session.flush().is_none());
}

#[test]
fn test_reset_discards_everything() {
    let mut session = session();
    session.push_line("COMBAT_LOG_VERSION,9,ADVANCED_LOG_ENABLED,1,BUILD_VERSION,2.5.1,PROJECT_ID,5");
    session.push_line(&match_start(T0));
    session.reset();

    assert!(session.flush().is_none());
    assert_eq!(session.ruleset(), Ruleset::Current);
    // Dedup lookback was cleared too
    assert!(session.push_line(&match_start(T0)).is_none());
    assert!(session.flush().is_some());
}

#[test]
fn test_anchor_year_defaults_to_current_year() {
    use chrono::{Datelike, Local};

    let session = ParsingSession::new(ParserConfig::default());
    assert_eq!(session.anchor_year(), Local::now().year());
}
