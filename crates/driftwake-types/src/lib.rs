//! Shared type definitions for the Driftwake event scheduler.
//!
//! This crate is the single source of truth for the data that crosses the
//! scheduler boundary: the world snapshot supplied by the host game, the
//! event catalog entries, and the risk payloads published to the HUD.
//! HUD-facing types flow to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`enums`] -- Zone, radiation, mission tier and risk level enumerations
//! - [`world`] -- World state snapshot read by the scheduler
//! - [`event`] -- Event catalog entries and their condition clauses
//! - [`risk`] -- Risk breakdowns, updates and scheduler statistics

pub mod enums;
pub mod event;
pub mod risk;
pub mod world;

// Re-export all public types at crate root for convenience.
pub use enums::{MissionTier, Radiation, RiskLevel, Zone};
pub use event::{
    ConditionClause, Conditions, DEFAULT_TRIGGER_WEIGHT, EventDefinition, EventMetadata,
    FactionRange, NumericRange, RadiationRange, Trigger, UNKNOWN_EVENT_TYPE,
};
pub use risk::{RiskAssessment, RiskBreakdown, RiskUpdate, SchedulerStats};
pub use world::{EventRecord, Location, Mission, WorldState};
