mod dedup;
mod token;
mod tokenizer;
mod version;

pub use dedup::Dedup;
pub use token::{NULL_GUID, Token, is_null_id};
pub use tokenizer::{LogLine, parse_log_line, parse_parameters, parse_timestamp};
pub use version::{LogVersion, Ruleset, is_version_line, parse_version_line};
