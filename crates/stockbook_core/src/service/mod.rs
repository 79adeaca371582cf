//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep outer surfaces decoupled from storage details.

pub mod holding_service;
