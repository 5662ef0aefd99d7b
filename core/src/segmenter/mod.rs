//! Groups the line stream into match segments.
//!
//! A segment opens on `ARENA_MATCH_START` and closes on one of:
//! - `ARENA_MATCH_END` (appended, then closed)
//! - another `ARENA_MATCH_START`
//! - a gap longer than the idle timeout between two timestamped lines
//! - an explicit flush
//!
//! Lines seen while no segment is open are dropped.

use serde::Serialize;

use crate::events::CombatEvent;

/// One item fed to the segmenter, in log order.
#[derive(Debug, Clone)]
pub enum LogItem {
    Event { event: CombatEvent, raw: String },
    /// Tokenized, but not a supported event.
    Unclassified { timestamp: i64, raw: String },
    /// Could not be tokenized. Carries no usable timestamp.
    Unparsed { raw: String },
}

impl LogItem {
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            LogItem::Event { event, .. } => Some(event.timestamp()),
            LogItem::Unclassified { timestamp, .. } => Some(*timestamp),
            LogItem::Unparsed { .. } => None,
        }
    }

    fn into_parts(self) -> (Option<CombatEvent>, String) {
        match self {
            LogItem::Event { event, raw } => (Some(event), raw),
            LogItem::Unclassified { raw, .. } | LogItem::Unparsed { raw } => (None, raw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloseReason {
    MatchEnd,
    NextMatchStart,
    IdleTimeout,
    Flush,
    VersionChange,
}

/// A closed run of lines attributed to one candidate match.
#[derive(Debug, Clone)]
pub struct Segment {
    pub events: Vec<CombatEvent>,
    /// Every line of the segment, classified or not, in log order.
    pub lines: Vec<String>,
    pub close_reason: CloseReason,
}

impl Segment {
    pub fn unparsed_line_count(&self) -> usize {
        self.lines.len().saturating_sub(self.events.len())
    }

    pub fn start_time(&self) -> i64 {
        self.events.first().map_or(0, CombatEvent::timestamp)
    }
}

#[derive(Debug, Default)]
struct OpenSegment {
    events: Vec<CombatEvent>,
    lines: Vec<String>,
}

#[derive(Debug)]
pub struct Segmenter {
    idle_timeout_ms: i64,
    last_timestamp: Option<i64>,
    current: Option<OpenSegment>,
}

impl Segmenter {
    pub fn new(idle_timeout_secs: i64) -> Self {
        Self {
            idle_timeout_ms: idle_timeout_secs * 1000,
            last_timestamp: None,
            current: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Feed one item. Returns the segment it closed, if any.
    pub fn push(&mut self, item: LogItem) -> Option<Segment> {
        let mut closed = None;

        if let Some(ts) = item.timestamp() {
            let timed_out = self
                .last_timestamp
                .is_some_and(|last| ts - last > self.idle_timeout_ms);
            if timed_out && self.current.is_some() {
                tracing::debug!(timestamp = ts, "[SEGMENT] idle timeout");
                closed = self.close(CloseReason::IdleTimeout);
            }
            self.last_timestamp = Some(ts);
        }

        let (event, raw) = item.into_parts();
        match event {
            Some(event) if event.is_match_start() => {
                if closed.is_none() {
                    closed = self.close(CloseReason::NextMatchStart);
                }
                self.current = Some(OpenSegment {
                    events: vec![event],
                    lines: vec![raw],
                });
            }
            Some(event) if event.is_match_end() => {
                if let Some(open) = self.current.as_mut() {
                    open.events.push(event);
                    open.lines.push(raw);
                    closed = self.close(CloseReason::MatchEnd);
                }
            }
            event => {
                if let Some(open) = self.current.as_mut() {
                    open.events.extend(event);
                    open.lines.push(raw);
                }
            }
        }

        closed
    }

    /// Close any open segment. Empty segments are never emitted.
    pub fn close(&mut self, reason: CloseReason) -> Option<Segment> {
        let open = self.current.take()?;
        if open.lines.is_empty() {
            return None;
        }
        Some(Segment {
            events: open.events,
            lines: open.lines,
            close_reason: reason,
        })
    }

    pub fn flush(&mut self) -> Option<Segment> {
        self.close(CloseReason::Flush)
    }

    pub fn reset(&mut self) {
        self.last_timestamp = None;
        self.current = None;
    }
}
