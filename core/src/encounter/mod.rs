//! Entity resolution and match building for closed segments.

mod builder;
mod evidence;
mod record;
mod unit;

pub use builder::{MatchBuilder, build_match};
pub use evidence::EvidenceTable;
pub use record::{ArenaMatch, MalformedMatch, MatchRecord, compute_match_id};
pub use unit::CombatUnit;
