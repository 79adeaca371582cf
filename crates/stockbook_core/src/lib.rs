//! Core domain logic for stockbook.
//! This crate is the single source of truth for holding invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::holding::{Holding, HoldingId, HoldingPatch, NewHolding};
pub use repo::holding_repo::{
    HoldingRepository, RepoError, RepoResult, SqliteHoldingRepository,
};
pub use service::holding_service::HoldingService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
