use rusqlite::Connection;
use stockbook_core::db::migrations::latest_version;
use stockbook_core::db::open_db_in_memory;
use stockbook_core::{
    HoldingPatch, HoldingRepository, HoldingService, NewHolding, RepoError,
    SqliteHoldingRepository,
};

fn new_holding(symbol: &str) -> NewHolding {
    NewHolding {
        symbol: symbol.to_string(),
        company_name: format!("{symbol} Corp."),
        shares: 10.0,
        average_cost: 100.0,
        memo: None,
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let created = repo
        .create(&NewHolding {
            symbol: "aapl".to_string(),
            company_name: "Apple Inc.".to_string(),
            shares: 10.0,
            average_cost: 150.0,
            memo: Some("long-term".to_string()),
        })
        .unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.symbol, "AAPL");

    let loaded = repo.get(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_assigns_strictly_increasing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let first = repo.create(&new_holding("AAPL")).unwrap();
    let second = repo.create(&new_holding("MSFT")).unwrap();
    assert!(second.id > first.id);

    // Deleting the newest row must not let its id be reused.
    repo.delete(second.id).unwrap();
    let third = repo.create(&new_holding("GOOG")).unwrap();
    assert!(third.id > second.id);
}

#[test]
fn duplicate_symbol_is_rejected_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    repo.create(&new_holding("aapl")).unwrap();

    let err = repo.create(&new_holding("AAPL")).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateSymbol(symbol) if symbol == "AAPL"));
}

#[test]
fn list_returns_all_rows_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    assert!(repo.list().unwrap().is_empty());

    repo.create(&new_holding("AAPL")).unwrap();
    repo.create(&new_holding("MSFT")).unwrap();
    repo.create(&new_holding("GOOG")).unwrap();

    let holdings = repo.list().unwrap();
    assert_eq!(holdings.len(), 3);
    let ids: Vec<_> = holdings.iter().map(|holding| holding.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn empty_patch_behaves_like_get() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let created = repo.create(&new_holding("AAPL")).unwrap();

    let unchanged = repo.update(created.id, &HoldingPatch::default()).unwrap();
    assert_eq!(unchanged, repo.get(created.id).unwrap());

    let err = repo.update(999, &HoldingPatch::default()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(999)));
}

#[test]
fn partial_update_changes_only_named_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let created = repo
        .create(&NewHolding {
            symbol: "AAPL".to_string(),
            company_name: "Apple Inc.".to_string(),
            shares: 10.0,
            average_cost: 150.0,
            memo: Some("long-term".to_string()),
        })
        .unwrap();

    let patch = HoldingPatch {
        shares: Some(6.0),
        ..HoldingPatch::default()
    };
    let updated = repo.update(created.id, &patch).unwrap();

    assert_eq!(updated.shares, 6.0);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.symbol, created.symbol);
    assert_eq!(updated.company_name, created.company_name);
    assert_eq!(updated.average_cost, created.average_cost);
    assert_eq!(updated.memo, created.memo);
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn update_normalizes_symbol_and_detects_collisions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let apple = repo.create(&new_holding("AAPL")).unwrap();
    let microsoft = repo.create(&new_holding("MSFT")).unwrap();

    // Writing a holding's own symbol back to itself is not a collision.
    let same = repo
        .update(
            apple.id,
            &HoldingPatch {
                symbol: Some("aapl".to_string()),
                ..HoldingPatch::default()
            },
        )
        .unwrap();
    assert_eq!(same.symbol, "AAPL");

    let err = repo
        .update(
            microsoft.id,
            &HoldingPatch {
                symbol: Some("aapl".to_string()),
                ..HoldingPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateSymbol(symbol) if symbol == "AAPL"));
}

#[test]
fn update_can_clear_memo() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let created = repo
        .create(&NewHolding {
            memo: Some("watch earnings".to_string()),
            ..new_holding("AAPL")
        })
        .unwrap();
    assert!(created.memo.is_some());

    let patch = HoldingPatch {
        memo: Some(None),
        ..HoldingPatch::default()
    };
    let updated = repo.update(created.id, &patch).unwrap();
    assert_eq!(updated.memo, None);
}

#[test]
fn update_missing_id_returns_not_found_for_any_field_set() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let patch = HoldingPatch {
        shares: Some(1.0),
        ..HoldingPatch::default()
    };
    let err = repo.update(42, &patch).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn delete_removes_row_permanently() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let created = repo.create(&new_holding("AAPL")).unwrap();
    repo.delete(created.id).unwrap();

    let get_err = repo.get(created.id).unwrap_err();
    assert!(matches!(get_err, RepoError::NotFound(id) if id == created.id));

    let second_delete = repo.delete(created.id).unwrap_err();
    assert!(matches!(second_delete, RepoError::NotFound(id) if id == created.id));
}

#[test]
fn clear_empties_the_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    repo.create(&new_holding("AAPL")).unwrap();
    repo.create(&new_holding("MSFT")).unwrap();

    repo.clear().unwrap();
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn seed_stops_at_first_failure_and_keeps_earlier_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let items = [
        new_holding("AAPL"),
        new_holding("MSFT"),
        new_holding("aapl"),
        new_holding("GOOG"),
    ];
    let err = repo.seed(&items).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateSymbol(symbol) if symbol == "AAPL"));

    let symbols: Vec<_> = repo
        .list()
        .unwrap()
        .into_iter()
        .map(|holding| holding.symbol)
        .collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();
    let service = HoldingService::new(repo);

    let seeded = service
        .seed(&[new_holding("AAPL"), new_holding("MSFT")])
        .unwrap();
    assert_eq!(seeded.len(), 2);

    let fetched = service.get(seeded[0].id).unwrap();
    assert_eq!(fetched.symbol, "AAPL");

    let updated = service
        .update(
            fetched.id,
            &HoldingPatch {
                memo: Some(Some("reassessed".to_string())),
                ..HoldingPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.memo.as_deref(), Some("reassessed"));

    service.delete(fetched.id).unwrap();
    assert_eq!(service.list().unwrap().len(), 1);

    service.clear().unwrap();
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteHoldingRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteHoldingRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("stock_holdings"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE stock_holdings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol TEXT NOT NULL UNIQUE,
            company_name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteHoldingRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "stock_holdings",
            column: "shares"
        })
    ));
}

#[test]
fn numeric_fields_read_back_as_floats_from_integer_affinity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHoldingRepository::try_new(&conn).unwrap();

    let created = repo.create(&new_holding("AAPL")).unwrap();

    // Force integer storage for the numeric columns; reads must still
    // surface floating point values.
    conn.execute(
        "UPDATE stock_holdings SET shares = 7, average_cost = 120 WHERE id = ?1;",
        [created.id],
    )
    .unwrap();

    let loaded = repo.get(created.id).unwrap();
    assert_eq!(loaded.shares, 7.0);
    assert_eq!(loaded.average_cost, 120.0);
}
