//! arenalog-parse-worker - parses one arena combat log file.
//!
//! Usage: arenalog-parse-worker <log_file> [config.toml]
//!
//! Output: JSON to stdout with a summary of every match found.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use arenalog_core::config::load_config;
use arenalog_core::{MatchRecord, ParsingSession};
use arenalog_core::combat_log::Ruleset;
use arenalog_types::{CombatResult, ParserConfig};
use memchr::memchr_iter;
use memmap2::Mmap;
use serde::Serialize;
use tracing_subscriber::filter::EnvFilter;

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MatchSummary {
    id: String,
    ruleset: Ruleset,
    start_time: i64,
    end_time: i64,
    bracket: String,
    zone_id: String,
    is_ranked: bool,
    result: CombatResult,
    player_team_id: String,
    player_team_rating: i64,
    unit_count: usize,
    has_advanced_logging: bool,
    unparsed_line_count: usize,
}

#[derive(Debug, Default, Serialize)]
struct WorkerOutput {
    matches: Vec<MatchSummary>,
    malformed_match_ids: Vec<String>,
    line_count: usize,
    elapsed_ms: u128,
}

impl WorkerOutput {
    fn record(&mut self, record: MatchRecord) {
        match record {
            MatchRecord::WellFormed(m) => self.matches.push(MatchSummary {
                id: m.id,
                ruleset: m.ruleset,
                start_time: m.start_time,
                end_time: m.end_time,
                bracket: m.start_info.bracket,
                zone_id: m.start_info.zone_id,
                is_ranked: m.start_info.is_ranked,
                result: m.result,
                player_team_id: m.player_team_id,
                player_team_rating: m.player_team_rating,
                unit_count: m.units.len(),
                has_advanced_logging: m.has_advanced_logging,
                unparsed_line_count: m.unparsed_line_count,
            }),
            MatchRecord::Malformed(m) => self.malformed_match_ids.push(m.id),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry point
// ─────────────────────────────────────────────────────────────────────────────

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If ARENALOG_LOG_PATH is set, append to that file
    if let Ok(path) = std::env::var("ARENALOG_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
            return;
        }
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        tracing::error!("Usage: arenalog-parse-worker <log_file> [config.toml]");
        std::process::exit(1);
    }

    let file_path = PathBuf::from(&args[1]);
    let config = match args.get(2) {
        Some(path) => match load_config(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load config");
                std::process::exit(1);
            }
        },
        None => ParserConfig::default(),
    };

    let timer = std::time::Instant::now();

    match parse_file(&file_path, config) {
        Ok(mut output) => {
            output.elapsed_ms = timer.elapsed().as_millis();
            tracing::info!(
                matches = output.matches.len(),
                malformed = output.malformed_match_ids.len(),
                lines = output.line_count,
                elapsed_ms = output.elapsed_ms as u64,
                "Parse complete"
            );

            // Output JSON to stdout for the caller
            match serde_json::to_string(&output) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize output");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Parse error");
            std::process::exit(1);
        }
    }
}

fn parse_file(file_path: &Path, config: ParserConfig) -> Result<WorkerOutput, String> {
    let file = File::open(file_path).map_err(|e| format!("Failed to open file: {}", e))?;
    let mmap = unsafe { Mmap::map(&file).map_err(|e| format!("Failed to mmap: {}", e))? };
    let bytes = mmap.as_ref();

    let mut session = ParsingSession::new(config);
    let mut output = WorkerOutput::default();

    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        push_bytes(&mut session, &mut output, &bytes[start..end]);
        start = end + 1;
    }
    if start < bytes.len() {
        push_bytes(&mut session, &mut output, &bytes[start..]);
    }

    if let Some(record) = session.flush() {
        output.record(record);
    }

    Ok(output)
}

fn push_bytes(session: &mut ParsingSession, output: &mut WorkerOutput, line: &[u8]) {
    output.line_count += 1;
    let line = String::from_utf8_lossy(line);
    if let Some(record) = session.push_line(&line) {
        output.record(record);
    }
}
