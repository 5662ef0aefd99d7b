//! Shared plain-data types for arenalog.
//!
//! Everything here is serde-friendly and free of parsing logic so that
//! downstream consumers (storage, presentation) can depend on it without
//! pulling in the ingestion pipeline.

mod config;
mod unit;

pub use config::ParserConfig;
pub use unit::{CombatResult, CombatUnitClass, CombatUnitReaction, CombatUnitSpec, CombatUnitType};
