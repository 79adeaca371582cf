//! Holding use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository normalization or error mapping.
//! - Service layer remains storage-agnostic.

use crate::model::holding::{Holding, HoldingId, HoldingPatch, NewHolding};
use crate::repo::holding_repo::{HoldingRepository, RepoResult};

/// Use-case service wrapper for holding CRUD operations.
pub struct HoldingService<R: HoldingRepository> {
    repo: R,
}

impl<R: HoldingRepository> HoldingService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new holding through repository persistence.
    pub fn create(&self, new_holding: &NewHolding) -> RepoResult<Holding> {
        self.repo.create(new_holding)
    }

    /// Gets one holding by stable id.
    pub fn get(&self, id: HoldingId) -> RepoResult<Holding> {
        self.repo.get(id)
    }

    /// Lists all holdings ordered by ascending id.
    pub fn list(&self) -> RepoResult<Vec<Holding>> {
        self.repo.list()
    }

    /// Applies a sparse update and returns the stored post-update record.
    ///
    /// Returns repository-level not-found or duplicate errors unchanged.
    pub fn update(&self, id: HoldingId, patch: &HoldingPatch) -> RepoResult<Holding> {
        self.repo.update(id, patch)
    }

    /// Permanently removes one holding by id.
    pub fn delete(&self, id: HoldingId) -> RepoResult<()> {
        self.repo.delete(id)
    }

    /// Removes all holdings.
    pub fn clear(&self) -> RepoResult<()> {
        self.repo.clear()
    }

    /// Bulk-creates holdings, stopping at the first failure.
    pub fn seed(&self, items: &[NewHolding]) -> RepoResult<Vec<Holding>> {
        self.repo.seed(items)
    }
}
