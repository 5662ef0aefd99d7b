use serde::{Deserialize, Serialize};

/// Tunables for the ingestion pipeline.
///
/// Loaded from TOML; every field falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Gap between two timestamped lines after which an open segment is closed.
    pub idle_timeout_secs: i64,
    /// A unit needs strictly more bucketed events than this to count as active.
    pub min_active_event_count: usize,
    /// A unit needs a lifespan strictly longer than this to count as active.
    pub min_active_duration_ms: i64,
    /// Year used to anchor `M/D` timestamps. `None` means the year the
    /// parsing session was created in.
    pub anchor_year: Option<i32>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 60,
            min_active_event_count: 6,
            min_active_duration_ms: 2000,
            anchor_year: None,
        }
    }
}
