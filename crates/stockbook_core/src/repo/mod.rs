//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for holdings.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateSymbol`)
//!   in addition to DB transport errors.
//! - Storage-engine constraint signals never escape this layer raw.

pub mod holding_repo;
