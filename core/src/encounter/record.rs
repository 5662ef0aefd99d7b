use std::collections::BTreeMap;

use arenalog_types::CombatResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::unit::CombatUnit;
use crate::combat_log::Ruleset;
use crate::events::{ArenaMatchEnd, ArenaMatchStart};
use crate::segmenter::CloseReason;

/// Terminal output of the pipeline for one segment.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum MatchRecord {
    WellFormed(ArenaMatch),
    Malformed(MalformedMatch),
}

impl MatchRecord {
    pub fn id(&self) -> &str {
        match self {
            MatchRecord::WellFormed(m) => &m.id,
            MatchRecord::Malformed(m) => &m.id,
        }
    }

    pub fn start_time(&self) -> i64 {
        match self {
            MatchRecord::WellFormed(m) => m.start_time,
            MatchRecord::Malformed(m) => m.start_time,
        }
    }

    pub fn raw_lines(&self) -> &[String] {
        match self {
            MatchRecord::WellFormed(m) => &m.raw_lines,
            MatchRecord::Malformed(m) => &m.raw_lines,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        matches!(self, MatchRecord::WellFormed(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArenaMatch {
    pub id: String,
    pub ruleset: Ruleset,
    pub start_time: i64,
    pub end_time: i64,
    /// Well-formed units keyed by unit id. Pet output is already folded into
    /// the owning player.
    pub units: BTreeMap<String, CombatUnit>,
    pub player_team_id: String,
    pub player_team_rating: i64,
    pub result: CombatResult,
    pub has_advanced_logging: bool,
    pub raw_lines: Vec<String>,
    pub unparsed_line_count: usize,
    pub start_info: ArenaMatchStart,
    pub end_info: ArenaMatchEnd,
}

#[derive(Debug, Clone, Serialize)]
pub struct MalformedMatch {
    pub id: String,
    pub start_time: i64,
    pub raw_lines: Vec<String>,
    pub unparsed_line_count: usize,
    pub close_reason: CloseReason,
}

/// Content address of a segment: lowercase hex SHA-256 over every raw line
/// followed by a newline.
pub fn compute_match_id(lines: &[String]) -> String {
    let mut hasher = Sha256::new();
    for line in lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_id_is_deterministic() {
        let lines = vec!["a".to_string(), "b".to_string()];
        let id = compute_match_id(&lines);
        assert_eq!(id, compute_match_id(&lines));
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_match_id_depends_on_line_boundaries() {
        let split = vec!["ab".to_string(), "c".to_string()];
        let joined = vec!["a".to_string(), "bc".to_string()];
        assert_ne!(compute_match_id(&split), compute_match_id(&joined));
    }

    #[test]
    fn test_match_id_of_empty_input() {
        assert_eq!(
            compute_match_id(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
