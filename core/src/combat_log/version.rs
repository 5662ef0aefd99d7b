//! `COMBAT_LOG_VERSION` control line.

use memchr::memmem;
use serde::Serialize;

const VERSION_MARKER: &str = "COMBAT_LOG_VERSION,";

/// Rule set selected by the client build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Ruleset {
    #[default]
    Current,
    /// Classic-era builds (`2.x`): fewer events, no win/loss payload.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogVersion {
    pub log_version: u32,
    pub advanced_log_enabled: bool,
    pub build_version: String,
    pub project_id: Option<u32>,
}

impl Default for LogVersion {
    fn default() -> Self {
        Self {
            log_version: 0,
            advanced_log_enabled: true,
            build_version: String::new(),
            project_id: None,
        }
    }
}

impl LogVersion {
    pub fn ruleset(&self) -> Ruleset {
        if self.build_version.starts_with("2.") {
            Ruleset::Legacy
        } else {
            Ruleset::Current
        }
    }
}

/// Cheap check used before any tokenizing.
pub fn is_version_line(line: &str) -> bool {
    memmem::find(line.as_bytes(), VERSION_MARKER.as_bytes()).is_some()
}

/// Parse a version control line, with or without a leading timestamp.
pub fn parse_version_line(line: &str) -> Option<LogVersion> {
    let start = memmem::find(line.as_bytes(), VERSION_MARKER.as_bytes())?;
    let body = line[start + VERSION_MARKER.len()..].trim_end();

    let mut fields = body.split(',');
    let log_version = fields.next()?.trim().parse().ok()?;
    let mut version = LogVersion {
        log_version,
        ..LogVersion::default()
    };

    while let Some(key) = fields.next() {
        let Some(value) = fields.next() else { break };
        let value = value.trim();
        match key.trim() {
            "ADVANCED_LOG_ENABLED" => version.advanced_log_enabled = value != "0",
            "BUILD_VERSION" => version.build_version = value.to_string(),
            "PROJECT_ID" => version.project_id = value.parse().ok(),
            _ => {}
        }
    }

    Some(version)
}
