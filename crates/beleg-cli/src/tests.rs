//! CLI command tests
//!
//! Commands run against throwaway unencrypted databases in a temp dir.

use crate::commands;

fn temp_db(dir: &tempfile::TempDir) -> std::path::PathBuf {
    dir.path().join("test.db")
}

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db(&dir);

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());
}

#[test]
fn test_cmd_seed_populates_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db(&dir);

    commands::cmd_seed(&path, 20, true).unwrap();

    let db = commands::open_db(&path, true).unwrap();
    assert_eq!(db.count_receipts().unwrap(), 20);
}

#[test]
fn test_cmd_audit_runs_on_seeded_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db(&dir);

    commands::cmd_seed(&path, 20, true).unwrap();
    commands::cmd_audit(&path, true).unwrap();
}

#[tokio::test]
async fn test_cmd_ask_without_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db(&dir);

    commands::cmd_seed(&path, 10, true).unwrap();
    commands::cmd_ask(&path, "receipts under 50", true)
        .await
        .unwrap();
}

#[test]
fn test_cmd_dataset_imports_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db(&dir);

    let data_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        data_dir.path().join("r1.json"),
        r#"{"valid_line": [
            {"category": "store.name", "words": [{"text": "Cafe"}]},
            {"category": "menu.nm", "words": [{"text": "Espresso"}]},
            {"category": "menu.price", "words": [{"text": "3.70"}]},
            {"category": "total.total_price", "words": [{"text": "3.70"}]}
        ]}"#,
    )
    .unwrap();

    commands::cmd_dataset(&path, data_dir.path(), None, true).unwrap();

    let db = commands::open_db(&path, true).unwrap();
    assert_eq!(db.count_receipts().unwrap(), 1);
}
