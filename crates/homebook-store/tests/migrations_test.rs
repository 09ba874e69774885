// Integration tests for the migration framework

use rusqlite::Connection;

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = homebook_store::migrations::apply_migrations(&mut conn);
    assert!(result.is_ok(), "Migrations should succeed: {:?}", result.err());

    let tables = get_table_names(&conn);
    for expected in [
        "schema_version",
        "properties",
        "books",
        "sections",
        "subsections",
        "media",
        "book_versions",
        "sqlite_sequence",
    ] {
        assert!(tables.contains(&expected.to_string()), "Missing table: {expected}");
    }
    assert_eq!(tables.len(), 8);
}

#[test]
fn test_migrations_are_recorded_with_checksums() {
    let mut conn = Connection::open_in_memory().unwrap();
    homebook_store::migrations::apply_migrations(&mut conn).unwrap();
    homebook_store::migrations::apply_migrations(&mut conn).unwrap();

    let rows: Vec<(String, String)> = conn
        .prepare("SELECT migration_id, checksum FROM schema_version ORDER BY id")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, "001_initial_schema");
    assert_eq!(rows[1].0, "002_book_versions");
    assert!(rows.iter().all(|(_, checksum)| checksum.len() == 64));
}

#[test]
fn test_edited_migration_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    homebook_store::migrations::apply_migrations(&mut conn).unwrap();

    conn.execute(
        "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '001_initial_schema'",
        [],
    )
    .unwrap();

    let err = homebook_store::migrations::apply_migrations(&mut conn).unwrap_err();
    assert_eq!(
        err.kind(),
        homebook_core::errors::ExErrorKind::ConstraintViolation
    );
}

#[test]
fn test_on_disk_database_is_created_with_parents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.db");

    let mut conn = homebook_store::db::open(&path).unwrap();
    homebook_store::migrations::apply_migrations(&mut conn).unwrap();
    assert!(path.exists());
}
