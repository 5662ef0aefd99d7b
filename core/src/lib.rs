//! Arena combat log ingestion.
//!
//! Raw lines flow through [`ParsingSession`]: duplicate filter, tokenizer,
//! event classifier, segmenter and match builder. Each pushed line yields at
//! most one [`MatchRecord`].

pub mod combat_log;
pub mod config;
pub mod encounter;
pub mod error;
pub mod events;
pub mod game_data;
pub mod segmenter;
pub mod session;

#[cfg(test)]
pub(crate) mod test_lines;

pub use combat_log::{LogLine, LogVersion, Ruleset, Token, parse_log_line};
pub use encounter::{ArenaMatch, CombatUnit, MalformedMatch, MatchRecord};
pub use error::{ConfigError, ParseError};
pub use events::{CombatEvent, LogEvent, classify};
pub use session::ParsingSession;
