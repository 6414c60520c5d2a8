//! Risk scoring, trigger conditions and the adaptive event scheduler.
//!
//! Everything here is driven by the host: time is passed in as epoch
//! milliseconds, world state is pushed in, and the only I/O is the catalog
//! fetch behind the [`EventCatalog`] trait.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `driftwake-config.yaml` into
//!   strongly-typed structs.
//! - [`risk`] -- Pure risk scoring, bracket and polling interval mapping.
//! - [`conditions`] -- Trigger condition interpreter and catalog filtering.
//! - [`selection`] -- Roulette-wheel weighted selection.
//! - [`cooldown`] -- Per-type cooldown ledger and bounded history.
//! - [`catalog`] -- [`EventCatalog`] trait and [`StaticCatalog`].
//! - [`scheduler`] -- The [`Scheduler`] state machine.
//!
//! [`EventCatalog`]: catalog::EventCatalog
//! [`StaticCatalog`]: catalog::StaticCatalog
//! [`Scheduler`]: scheduler::Scheduler

pub mod catalog;
pub mod conditions;
pub mod config;
pub mod cooldown;
pub mod risk;
pub mod scheduler;
pub mod selection;
