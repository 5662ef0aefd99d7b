use arenalog_types::ParserConfig;
use chrono::{Datelike, Local};

use crate::combat_log::{
    Dedup, LogVersion, Ruleset, is_version_line, parse_log_line, parse_version_line,
};
use crate::encounter::{MatchRecord, build_match};
use crate::events::{ClassifierContext, classify};
use crate::segmenter::{CloseReason, LogItem, Segment, Segmenter};

/// One ingestion pipeline: dedup, tokenize, classify, segment, build.
///
/// Lines are pushed one at a time; each push yields at most one record.
/// Nothing here touches the filesystem or the clock after construction.
#[derive(Debug)]
pub struct ParsingSession {
    config: ParserConfig,
    anchor_year: i32,
    dedup: Dedup,
    segmenter: Segmenter,
    version: LogVersion,
    classifier: ClassifierContext,
}

impl ParsingSession {
    pub fn new(config: ParserConfig) -> Self {
        let anchor_year = config.anchor_year.unwrap_or_else(|| Local::now().year());
        let segmenter = Segmenter::new(config.idle_timeout_secs);
        Self {
            config,
            anchor_year,
            dedup: Dedup::new(),
            segmenter,
            version: LogVersion::default(),
            classifier: ClassifierContext::default(),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn anchor_year(&self) -> i32 {
        self.anchor_year
    }

    pub fn log_version(&self) -> &LogVersion {
        &self.version
    }

    pub fn ruleset(&self) -> Ruleset {
        self.classifier.ruleset
    }

    /// Process one raw line.
    pub fn push_line(&mut self, line: &str) -> Option<MatchRecord> {
        let line = line.trim_end_matches(['\r', '\n']);
        // Blank lines still count as the previous line for dedup
        let accepted = self.dedup.accept(line);
        if line.trim().is_empty() {
            return None;
        }
        if !accepted {
            tracing::debug!("[PARSE] dropped duplicate line");
            return None;
        }

        if is_version_line(line) {
            if let Some(version) = parse_version_line(line) {
                return self.switch_version(version);
            }
            tracing::warn!(line, "[PARSE] unreadable COMBAT_LOG_VERSION line");
        }

        let item = match parse_log_line(line, self.anchor_year) {
            Ok(log_line) => match classify(&log_line, &self.classifier) {
                Ok(event) => LogItem::Event {
                    event,
                    raw: log_line.raw,
                },
                Err(e) => {
                    tracing::debug!(line_id = log_line.id, error = %e, "[PARSE] unclassified line");
                    LogItem::Unclassified {
                        timestamp: log_line.timestamp,
                        raw: log_line.raw,
                    }
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "[PARSE] unparsed line");
                LogItem::Unparsed {
                    raw: line.to_string(),
                }
            }
        };

        let segment = self.segmenter.push(item)?;
        Some(self.build(segment))
    }

    /// Close any open segment, e.g. at end of input.
    pub fn flush(&mut self) -> Option<MatchRecord> {
        let segment = self.segmenter.flush()?;
        Some(self.build(segment))
    }

    /// Drop all in-flight state and return to the default log version.
    pub fn reset(&mut self) {
        self.dedup.reset();
        self.segmenter.reset();
        self.version = LogVersion::default();
        self.classifier = ClassifierContext::default();
    }

    /// Flush under the old rules, then adopt the new header.
    fn switch_version(&mut self, version: LogVersion) -> Option<MatchRecord> {
        let record = self
            .segmenter
            .close(CloseReason::VersionChange)
            .map(|segment| self.build(segment));

        tracing::info!(
            log_version = version.log_version,
            build = %version.build_version,
            advanced = version.advanced_log_enabled,
            ruleset = ?version.ruleset(),
            "[PARSE] log version"
        );
        self.classifier = ClassifierContext {
            ruleset: version.ruleset(),
            advanced_log_enabled: version.advanced_log_enabled,
        };
        self.version = version;

        record
    }

    fn build(&self, segment: Segment) -> MatchRecord {
        let record = build_match(segment, self.classifier.ruleset, &self.config);
        if let MatchRecord::WellFormed(m) = &record {
            tracing::info!(
                match_id = %m.id,
                result = ?m.result,
                bracket = %m.start_info.bracket,
                units = m.units.len(),
                "[MATCH] well-formed match"
            );
        }
        record
    }
}
