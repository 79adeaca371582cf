//! Domain model for equity holdings.
//!
//! # Responsibility
//! - Define the canonical holding record and its write-request shapes.
//! - Own symbol normalization and the seconds-precision timestamp codec.
//!
//! # Invariants
//! - Every holding is identified by a storage-assigned `HoldingId`.
//! - Symbols are uppercase before any comparison or write.

pub mod holding;
