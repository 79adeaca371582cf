//! Holding repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `stock_holdings` table.
//! - Keep SQL details inside the core persistence boundary.
//! - Translate storage-level constraint violations into domain error kinds.
//!
//! # Invariants
//! - Symbols are normalized to uppercase before any comparison or write.
//! - Duplicate detection is delegated to the schema's UNIQUE constraint,
//!   never reimplemented as a check-then-insert.
//! - `id` and `created_at` are write-once; update statements never name them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::holding::{
    current_timestamp, format_created_at, normalize_symbol, parse_created_at, Holding, HoldingId,
    HoldingPatch, NewHolding,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const HOLDINGS_TABLE: &str = "stock_holdings";

const HOLDING_SELECT_SQL: &str = "SELECT
    id,
    symbol,
    company_name,
    shares,
    average_cost,
    memo,
    created_at
FROM stock_holdings";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for holding persistence and query operations.
///
/// `DuplicateSymbol` and `NotFound` are the two expected, recoverable
/// domain outcomes; everything else signals an unexpected storage failure
/// or an unusable connection.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    DuplicateSymbol(String),
    NotFound(HoldingId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateSymbol(symbol) => write!(f, "holding symbol already exists: {symbol}"),
            Self::NotFound(id) => write!(f, "holding not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted holding data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is older than required version {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for holding CRUD operations.
pub trait HoldingRepository {
    /// Persists a new holding and returns the fully populated record.
    fn create(&self, new_holding: &NewHolding) -> RepoResult<Holding>;
    /// Gets one holding by id.
    fn get(&self, id: HoldingId) -> RepoResult<Holding>;
    /// Lists all holdings ordered by ascending id.
    fn list(&self) -> RepoResult<Vec<Holding>>;
    /// Applies a sparse update and returns the post-update stored record.
    fn update(&self, id: HoldingId, patch: &HoldingPatch) -> RepoResult<Holding>;
    /// Permanently removes one holding by id.
    fn delete(&self, id: HoldingId) -> RepoResult<()>;
    /// Removes all holdings. Test/reset utility.
    fn clear(&self) -> RepoResult<()>;
    /// Creates holdings in order, stopping at the first failure.
    fn seed(&self, items: &[NewHolding]) -> RepoResult<Vec<Holding>>;
}

/// SQLite-backed holding repository.
pub struct SqliteHoldingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHoldingRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl HoldingRepository for SqliteHoldingRepository<'_> {
    fn create(&self, new_holding: &NewHolding) -> RepoResult<Holding> {
        let symbol = normalize_symbol(&new_holding.symbol);
        let created_at = current_timestamp();

        self.conn
            .execute(
                "INSERT INTO stock_holdings (
                    symbol,
                    company_name,
                    shares,
                    average_cost,
                    memo,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    symbol,
                    new_holding.company_name,
                    new_holding.shares,
                    new_holding.average_cost,
                    new_holding.memo,
                    format_created_at(created_at),
                ],
            )
            .map_err(|err| map_symbol_conflict(err, &symbol))?;

        Ok(Holding {
            id: self.conn.last_insert_rowid(),
            symbol,
            company_name: new_holding.company_name.clone(),
            shares: new_holding.shares,
            average_cost: new_holding.average_cost,
            memo: new_holding.memo.clone(),
            created_at,
        })
    }

    fn get(&self, id: HoldingId) -> RepoResult<Holding> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HOLDING_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => parse_holding_row(row),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn list(&self) -> RepoResult<Vec<Holding>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HOLDING_SELECT_SQL} ORDER BY id ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut holdings = Vec::new();
        while let Some(row) = rows.next()? {
            holdings.push(parse_holding_row(row)?);
        }

        Ok(holdings)
    }

    fn update(&self, id: HoldingId, patch: &HoldingPatch) -> RepoResult<Holding> {
        if patch.is_empty() {
            // Nothing to write; behaves exactly like `get`, including the
            // not-found outcome for a missing id.
            return self.get(id);
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        let mut written_symbol: Option<String> = None;

        if let Some(symbol) = patch.symbol.as_deref() {
            let symbol = normalize_symbol(symbol);
            assignments.push("symbol = ?");
            bind_values.push(Value::Text(symbol.clone()));
            written_symbol = Some(symbol);
        }
        if let Some(company_name) = patch.company_name.as_deref() {
            assignments.push("company_name = ?");
            bind_values.push(Value::Text(company_name.to_string()));
        }
        if let Some(shares) = patch.shares {
            assignments.push("shares = ?");
            bind_values.push(Value::Real(shares));
        }
        if let Some(average_cost) = patch.average_cost {
            assignments.push("average_cost = ?");
            bind_values.push(Value::Real(average_cost));
        }
        if let Some(memo) = patch.memo.as_ref() {
            assignments.push("memo = ?");
            bind_values.push(match memo {
                Some(text) => Value::Text(text.clone()),
                None => Value::Null,
            });
        }

        let sql = format!(
            "UPDATE stock_holdings SET {} WHERE id = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Integer(id));

        let changed = self
            .conn
            .execute(&sql, params_from_iter(bind_values))
            .map_err(|err| match written_symbol.as_deref() {
                Some(symbol) => map_symbol_conflict(err, symbol),
                None => RepoError::from(err),
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        // Re-read so callers see the authoritative stored state rather than
        // a client-side merge.
        self.get(id)
    }

    fn delete(&self, id: HoldingId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM stock_holdings WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM stock_holdings;", [])?;
        Ok(())
    }

    fn seed(&self, items: &[NewHolding]) -> RepoResult<Vec<Holding>> {
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            created.push(self.create(item)?);
        }
        Ok(created)
    }
}

fn map_symbol_conflict(err: rusqlite::Error, symbol: &str) -> RepoError {
    if err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
        return RepoError::DuplicateSymbol(symbol.to_string());
    }
    RepoError::from(err)
}

fn parse_holding_row(row: &Row<'_>) -> RepoResult<Holding> {
    let created_at_text: String = row.get("created_at")?;
    let created_at = parse_created_at(&created_at_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{created_at_text}` in stock_holdings.created_at"
        ))
    })?;

    Ok(Holding {
        id: row.get("id")?,
        symbol: row.get("symbol")?,
        company_name: row.get("company_name")?,
        // Read back as floating point regardless of the stored affinity.
        shares: row.get("shares")?,
        average_cost: row.get("average_cost")?,
        memo: row.get("memo")?,
        created_at,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, HOLDINGS_TABLE)? {
        return Err(RepoError::MissingRequiredTable(HOLDINGS_TABLE));
    }

    for column in [
        "id",
        "symbol",
        "company_name",
        "shares",
        "average_cost",
        "memo",
        "created_at",
    ] {
        if !table_has_column(conn, HOLDINGS_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: HOLDINGS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
