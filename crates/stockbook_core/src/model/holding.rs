//! Holding domain model.
//!
//! # Responsibility
//! - Define the canonical record for one equity position.
//! - Provide the write-request shapes used by create and partial update.
//!
//! # Invariants
//! - `id` and `created_at` are write-once; no update path touches them.
//! - `symbol` is stored uppercase; normalization happens before persistence.
//! - `created_at` carries whole-second precision only.

use chrono::{NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Stable storage-assigned identifier for a holding.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type HoldingId = i64;

/// Textual form used for `created_at` in storage and on the wire.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Canonical domain record for one equity holding.
///
/// Callers always receive owned copies; rows stay exclusively owned by the
/// persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Storage-assigned surrogate id, strictly increasing per store.
    pub id: HoldingId,
    /// Ticker symbol, uppercase, unique across all holdings.
    pub symbol: String,
    /// Free-text company name.
    pub company_name: String,
    /// Share quantity. Not enforced non-negative.
    pub shares: f64,
    /// Average cost per share. Not enforced non-negative.
    pub average_cost: f64,
    /// Optional free-text memo.
    pub memo: Option<String>,
    /// Creation time in UTC, truncated to whole seconds.
    pub created_at: NaiveDateTime,
}

/// Field-set for creating one holding.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHolding {
    pub symbol: String,
    pub company_name: String,
    pub shares: f64,
    pub average_cost: f64,
    pub memo: Option<String>,
}

/// Sparse update for one holding.
///
/// Each updatable column is wrapped in a presence container: `None` leaves
/// the stored value unchanged. `memo` uses a nested option so that clearing
/// the memo (`Some(None)`) stays distinct from leaving it alone (`None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingPatch {
    pub symbol: Option<String>,
    pub company_name: Option<String>,
    pub shares: Option<f64>,
    pub average_cost: Option<f64>,
    pub memo: Option<Option<String>>,
}

impl HoldingPatch {
    /// Returns whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.company_name.is_none()
            && self.shares.is_none()
            && self.average_cost.is_none()
            && self.memo.is_none()
    }
}

/// Normalizes a ticker symbol for storage and uniqueness comparison.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.to_uppercase()
}

/// Returns the current UTC time truncated (not rounded) to whole seconds.
pub fn current_timestamp() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Renders a `created_at` value in its canonical textual form.
pub fn format_created_at(value: NaiveDateTime) -> String {
    value.format(CREATED_AT_FORMAT).to_string()
}

/// Parses the canonical textual form back into a timestamp.
pub fn parse_created_at(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, CREATED_AT_FORMAT)
}
