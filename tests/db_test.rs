use std::path::{Path, PathBuf};

use tablite::db::{self, CellValue, Database, RowSink};
use tablite::error::TabliteError;
use tempfile::TempDir;

/// Collects a streamed result set for assertions.
#[derive(Default)]
struct CollectSink {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RowSink for CollectSink {
    fn columns(&mut self, names: &[String]) -> Result<(), TabliteError> {
        self.columns = names.to_vec();
        Ok(())
    }

    fn row(&mut self, cells: &[CellValue]) -> Result<(), TabliteError> {
        self.rows.push(cells.to_vec());
        Ok(())
    }
}

/// Builds the actor fixture: 10 rows, 3 columns.
fn fixture_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("example.sqlite");
    let conn = rusqlite::Connection::open(&path).expect("open fixture");
    conn.execute_batch(
        "CREATE TABLE actor (actor_id INTEGER PRIMARY KEY, first_name TEXT, last_name TEXT);
         INSERT INTO actor (actor_id, first_name, last_name) VALUES
           (1, 'Penelope', 'Guiness'),
           (2, 'Nick', 'Wahlberg'),
           (3, 'Ed', 'Chase'),
           (4, 'Jennifer', 'Davis'),
           (5, 'Johnny', 'Lollobrigida'),
           (6, 'Bette', 'Nicholson'),
           (7, 'Grace', 'Mostel'),
           (8, 'Matthew', 'Johansson'),
           (9, 'Joe', 'Swank'),
           (10, 'Christian', 'Gable');",
    )
    .expect("seed fixture");
    path
}

fn open(path: &Path) -> Database {
    Database::open(path, &path.display().to_string()).expect("open database")
}

fn query_rows(db: &Database, sql: &str, params: &[String]) -> CollectSink {
    let mut sink = CollectSink::default();
    db.query(sql, params, &mut sink).expect("query");
    sink
}

// --- query path ---

#[test]
fn query_streams_all_rows_with_column_names() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));

    let sink = query_rows(&db, "SELECT * FROM actor", &[]);
    assert_eq!(sink.columns, vec!["actor_id", "first_name", "last_name"]);
    assert_eq!(sink.rows.len(), 10);
    for row in &sink.rows {
        assert_eq!(row.len(), sink.columns.len());
    }
}

#[test]
fn query_binds_positional_string_parameters() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));

    let sink = query_rows(
        &db,
        "SELECT last_name FROM actor WHERE first_name = ?",
        &["Nick".to_string()],
    );
    assert_eq!(sink.rows.len(), 1);
    assert_eq!(sink.rows[0][0], CellValue::Text("Wahlberg".to_string()));
}

#[test]
fn query_coerces_every_value_to_text_and_null_to_null() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("types.sqlite");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE t (i INTEGER, r REAL, s TEXT, n TEXT);
         INSERT INTO t VALUES (42, 1.5, 'hi', NULL);",
    )
    .unwrap();
    drop(conn);

    let db = open(&path);
    let sink = query_rows(&db, "SELECT i, r, s, n FROM t", &[]);
    assert_eq!(
        sink.rows[0],
        vec![
            CellValue::Text("42".to_string()),
            CellValue::Text("1.5".to_string()),
            CellValue::Text("hi".to_string()),
            CellValue::Null,
        ]
    );
}

#[test]
fn query_with_no_matches_still_reports_columns() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));

    let sink = query_rows(
        &db,
        "SELECT * FROM actor WHERE first_name = ?",
        &["Nobody".to_string()],
    );
    assert_eq!(sink.columns.len(), 3);
    assert!(sink.rows.is_empty());
}

#[test]
fn query_returns_streamed_row_count() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));

    let mut sink = CollectSink::default();
    let streamed = db.query("SELECT * FROM actor", &[], &mut sink).unwrap();
    assert_eq!(streamed, 10);
}

#[test]
fn bad_sql_surfaces_an_engine_error_with_the_locator() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));

    let mut sink = CollectSink::default();
    let err = db
        .query("SELECT * FROM no_such_table", &[], &mut sink)
        .unwrap_err();
    match err {
        TabliteError::Statement { locator, .. } => {
            assert!(locator.contains("example.sqlite"));
        }
        other => panic!("expected Statement error, got {other:?}"),
    }
}

// --- exec path ---

#[test]
fn insert_reports_one_row_affected_and_the_new_id() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));

    let outcome = db
        .exec(
            "INSERT INTO actor (actor_id, first_name, last_name) VALUES (11, 'Kubla', 'Khan')",
            &[],
        )
        .unwrap();
    assert_eq!(outcome.rows_affected, 1);
    assert_eq!(outcome.last_insert_id, Some(11));

    let sink = query_rows(&db, "SELECT * FROM actor", &[]);
    assert_eq!(sink.rows.len(), 11);
}

#[test]
fn delete_matching_one_row_reports_one_affected() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));

    let outcome = db
        .exec(
            "DELETE FROM actor WHERE first_name = ?",
            &["Nick".to_string()],
        )
        .unwrap();
    assert_eq!(outcome.rows_affected, 1);

    let sink = query_rows(&db, "SELECT * FROM actor", &[]);
    assert_eq!(sink.rows.len(), 9);
}

#[test]
fn delete_matching_nothing_reports_zero_affected_and_no_insert_id() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));

    let outcome = db
        .exec(
            "DELETE FROM actor WHERE first_name = ?",
            &["Kubla".to_string()],
        )
        .unwrap();
    assert_eq!(outcome.rows_affected, 0);
    assert_eq!(outcome.last_insert_id, None);
}

#[test]
fn exec_with_wrong_parameter_count_surfaces_the_engine_error() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));

    let err = db
        .exec("DELETE FROM actor WHERE first_name = ?", &[])
        .unwrap_err();
    assert!(matches!(err, TabliteError::Statement { .. }));
}

// --- open / ping / create ---

#[test]
fn opening_a_missing_file_is_a_not_found_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.sqlite");

    let err = Database::open(&missing, "absent.sqlite").unwrap_err();
    assert!(matches!(err, TabliteError::NotFound { .. }));
}

#[test]
fn ping_succeeds_on_a_healthy_database() {
    let dir = TempDir::new().unwrap();
    let db = open(&fixture_db(&dir));
    db.ping().unwrap();
}

#[test]
fn create_makes_the_file_and_returns_an_absolute_path() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("fresh.sqlite");
    assert!(!target.exists());

    let absolute = db::create(&target).unwrap();
    assert!(absolute.is_absolute());
    assert!(target.exists());

    // The created database must be reachable.
    open(&absolute).ping().unwrap();
}
