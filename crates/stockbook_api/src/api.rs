//! Holdings routing adapter.
//!
//! # Responsibility
//! - Dispatch `/holdings` paths onto the core service.
//! - Build request shapes (`NewHolding`, `HoldingPatch`) from JSON payloads.
//! - Map `DuplicateSymbol`/`NotFound` onto 409/404 and malformed input
//!   onto 422.
//!
//! # Invariants
//! - Recognized payload keys drive the partial update; unknown keys are
//!   ignored.
//! - Domain values cross this boundary as flat field-for-field records.

use log::error;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use serde_json::{json, Map, Value};
use stockbook_core::model::holding::{current_timestamp, format_created_at};
use stockbook_core::{
    Holding, HoldingId, HoldingPatch, HoldingService, NewHolding, RepoError, RepoResult,
    SqliteHoldingRepository,
};

static HOLDING_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/holdings/(\d+)$").expect("valid holding path regex"));

/// Status plus optional JSON body returned by every adapter call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn with_body(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    fn detail(status: u16, message: impl Into<String>) -> Self {
        Self::with_body(status, json!({ "detail": message.into() }))
    }
}

/// Routing adapter over the holdings service.
///
/// Mimics the verb surface of an HTTP client so the backend can be exercised
/// without a network stack.
pub struct HoldingsApi<'conn> {
    service: HoldingService<SqliteHoldingRepository<'conn>>,
}

impl<'conn> HoldingsApi<'conn> {
    /// Constructs the adapter over a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let repo = SqliteHoldingRepository::try_new(conn)?;
        Ok(Self {
            service: HoldingService::new(repo),
        })
    }

    /// `POST /holdings` — create one holding.
    pub fn post(&self, path: &str, payload: &Value) -> ApiResponse {
        if path != "/holdings" {
            return route_not_found();
        }

        let new_holding = match parse_new_holding(payload) {
            Ok(new_holding) => new_holding,
            Err(response) => return response,
        };

        match self.service.create(&new_holding) {
            Ok(holding) => ApiResponse::with_body(201, holding_to_wire(&holding)),
            Err(RepoError::DuplicateSymbol(symbol)) => {
                ApiResponse::detail(409, format!("holding already exists: {symbol}"))
            }
            Err(err) => internal_error(err),
        }
    }

    /// `GET /holdings`, `GET /holdings/{id}`, `GET /health`.
    pub fn get(&self, path: &str) -> ApiResponse {
        if path == "/holdings" {
            return match self.service.list() {
                Ok(holdings) => ApiResponse::with_body(
                    200,
                    Value::Array(holdings.iter().map(holding_to_wire).collect()),
                ),
                Err(err) => internal_error(err),
            };
        }

        if path == "/health" {
            return ApiResponse::with_body(
                200,
                json!({
                    "status": "ok",
                    "timestamp": format_created_at(current_timestamp()),
                }),
            );
        }

        let id = match parse_holding_path(path) {
            Some(id) => id,
            None => return route_not_found(),
        };
        match self.service.get(id) {
            Ok(holding) => ApiResponse::with_body(200, holding_to_wire(&holding)),
            Err(RepoError::NotFound(_)) => holding_not_found(),
            Err(err) => internal_error(err),
        }
    }

    /// `PUT /holdings/{id}` — sparse update; absent keys stay unchanged.
    pub fn put(&self, path: &str, payload: &Value) -> ApiResponse {
        let id = match parse_holding_path(path) {
            Some(id) => id,
            None => return route_not_found(),
        };

        let patch = match parse_patch(payload) {
            Ok(patch) => patch,
            Err(response) => return response,
        };

        match self.service.update(id, &patch) {
            Ok(holding) => ApiResponse::with_body(200, holding_to_wire(&holding)),
            Err(RepoError::NotFound(_)) => holding_not_found(),
            Err(RepoError::DuplicateSymbol(symbol)) => {
                ApiResponse::detail(409, format!("holding already exists: {symbol}"))
            }
            Err(err) => internal_error(err),
        }
    }

    /// `DELETE /holdings/{id}`.
    pub fn delete(&self, path: &str) -> ApiResponse {
        let id = match parse_holding_path(path) {
            Some(id) => id,
            None => return route_not_found(),
        };

        match self.service.delete(id) {
            Ok(()) => ApiResponse::empty(204),
            Err(RepoError::NotFound(_)) => holding_not_found(),
            Err(err) => internal_error(err),
        }
    }
}

fn parse_holding_path(path: &str) -> Option<HoldingId> {
    HOLDING_PATH_RE
        .captures(path)
        .and_then(|captures| captures.get(1))
        .and_then(|id| id.as_str().parse::<HoldingId>().ok())
}

fn parse_new_holding(payload: &Value) -> Result<NewHolding, ApiResponse> {
    let fields = payload_object(payload)?;
    Ok(NewHolding {
        symbol: required_text(fields, "symbol")?,
        company_name: required_text(fields, "company_name")?,
        shares: required_number(fields, "shares")?,
        average_cost: required_number(fields, "average_cost")?,
        memo: optional_text(fields, "memo")?,
    })
}

fn parse_patch(payload: &Value) -> Result<HoldingPatch, ApiResponse> {
    let fields = payload_object(payload)?;
    let mut patch = HoldingPatch::default();
    if fields.contains_key("symbol") {
        patch.symbol = Some(required_text(fields, "symbol")?);
    }
    if fields.contains_key("company_name") {
        patch.company_name = Some(required_text(fields, "company_name")?);
    }
    if fields.contains_key("shares") {
        patch.shares = Some(required_number(fields, "shares")?);
    }
    if fields.contains_key("average_cost") {
        patch.average_cost = Some(required_number(fields, "average_cost")?);
    }
    if fields.contains_key("memo") {
        patch.memo = Some(optional_text(fields, "memo")?);
    }
    Ok(patch)
}

fn payload_object(payload: &Value) -> Result<&Map<String, Value>, ApiResponse> {
    payload
        .as_object()
        .ok_or_else(|| ApiResponse::detail(422, "request body must be a JSON object"))
}

fn required_text(fields: &Map<String, Value>, key: &str) -> Result<String, ApiResponse> {
    match fields.get(key) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(ApiResponse::detail(422, format!("invalid field: {key}"))),
        None => Err(ApiResponse::detail(422, format!("missing field: {key}"))),
    }
}

fn required_number(fields: &Map<String, Value>, key: &str) -> Result<f64, ApiResponse> {
    match fields.get(key) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| ApiResponse::detail(422, format!("invalid field: {key}"))),
        None => Err(ApiResponse::detail(422, format!("missing field: {key}"))),
    }
}

fn optional_text(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, ApiResponse> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(ApiResponse::detail(422, format!("invalid field: {key}"))),
    }
}

fn holding_to_wire(holding: &Holding) -> Value {
    json!({
        "id": holding.id,
        "symbol": holding.symbol,
        "company_name": holding.company_name,
        "shares": holding.shares,
        "average_cost": holding.average_cost,
        "memo": holding.memo,
        "created_at": format_created_at(holding.created_at),
    })
}

fn route_not_found() -> ApiResponse {
    ApiResponse::detail(404, "not found")
}

fn holding_not_found() -> ApiResponse {
    ApiResponse::detail(404, "holding not found")
}

fn internal_error(err: RepoError) -> ApiResponse {
    error!("event=api_request module=api status=error error={err}");
    ApiResponse::detail(500, "internal error")
}
