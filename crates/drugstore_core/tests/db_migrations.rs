use drugstore_core::db::migrations::latest_version;
use drugstore_core::db::{open_db, open_db_in_memory, DbError};
use drugstore_core::{DrugRepository, RepoError, SqliteDrugRepository, SqliteTodoRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in ["drugs", "dispensations", "signatures", "todos"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_keeps_data_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drugstore.db");

    let mut conn_first = open_db(&path).unwrap();
    let drug = drugstore_core::Drug::new("Aspirin", "mg", drugstore_core::DrugForm::Oral);
    SqliteDrugRepository::try_new(&mut conn_first)
        .unwrap()
        .create_drug(&drug)
        .unwrap();
    drop(conn_first);

    let mut conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let repo = SqliteDrugRepository::try_new(&mut conn_second).unwrap();
    assert!(repo.get_drug(drug.uuid).unwrap().is_some());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_refuse_unmigrated_connections() {
    let mut raw = Connection::open_in_memory().unwrap();
    let err = SqliteDrugRepository::try_new(&mut raw).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("drugs")));

    let err = SqliteTodoRepository::try_new(&raw).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("todos")));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
