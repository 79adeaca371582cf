//! HTTP-like routing surface over stockbook core.
//!
//! # Responsibility
//! - Map path strings and verb calls onto core CRUD operations.
//! - Translate domain error kinds into client-facing status codes.
//! - Serialize holdings into flat JSON wire records.
//!
//! # Invariants
//! - This crate owns all user-facing text; core never formats any.
//! - No storage detail leaks past the core's public interface.

pub mod api;

pub use api::{ApiResponse, HoldingsApi};
