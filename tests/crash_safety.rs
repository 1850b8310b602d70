use json_vault::{FlushPolicy, JsonVault};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn open_creates_dir_and_empty_file() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let db = JsonVault::open(&nested).unwrap();
    assert!(db.is_empty());
    assert_eq!(std::fs::read_to_string(db.path()).unwrap(), "{}");
}

#[test]
fn persist_and_reload_roundtrip() {
    let dir = tempdir().unwrap();
    {
        let db = JsonVault::open(dir.path()).unwrap();
        db.set("k1", "v1").unwrap();
        db.set("k2", json!({"nested": [1, 2]})).unwrap();
        db.add("n", 2.5).unwrap();
        db.flush().unwrap();
    }
    let db = JsonVault::open(dir.path()).unwrap();
    assert_eq!(db.get("k1").unwrap(), Some(json!("v1")));
    assert_eq!(db.get("k2").unwrap(), Some(json!({"nested": [1, 2]})));
    assert_eq!(db.get("n").unwrap(), Some(json!(2.5)));
    let keys: Vec<_> = db.all(0).into_iter().map(|e| e.key).collect();
    assert_eq!(keys, vec!["k1", "k2", "n"]);
}

#[test]
fn reload_sees_only_what_was_flushed() {
    let dir = tempdir().unwrap();
    let db = JsonVault::builder(dir.path())
        .policy(FlushPolicy::Manual)
        .build()
        .unwrap();
    db.set("flushed", 1).unwrap();
    db.flush().unwrap();
    db.set("unflushed", 2).unwrap();

    // no orderly shutdown: the handle never gets to run its final flush
    std::mem::forget(db);

    let db = JsonVault::open(dir.path()).unwrap();
    assert_eq!(db.get("flushed").unwrap(), Some(json!(1)));
    assert_eq!(db.get("unflushed").unwrap(), None);
    assert_eq!(db.len(), 1);
}

#[test]
fn corrupt_file_recovers_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("database.json");
    std::fs::write(&path, b"{ this is not json").unwrap();

    let db = JsonVault::builder(dir.path())
        .policy(FlushPolicy::Manual)
        .build()
        .unwrap();
    assert!(db.is_empty());
    // still corrupt until something is written
    assert_eq!(std::fs::read(&path).unwrap(), b"{ this is not json");

    db.set("fresh", true).unwrap();
    db.flush().unwrap();
    let db2 = JsonVault::open(dir.path()).unwrap();
    assert_eq!(db2.get("fresh").unwrap(), Some(json!(true)));
}

#[test]
fn non_object_file_recovers_as_empty() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("database.json"), b"[1, 2, 3]").unwrap();
    let db = JsonVault::open(dir.path()).unwrap();
    assert!(db.is_empty());
}

#[test]
fn blank_file_is_empty_store() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("database.json"), b"  \n").unwrap();
    let db = JsonVault::open(dir.path()).unwrap();
    assert!(db.is_empty());
}

#[test]
fn no_temp_file_left_behind() {
    let dir = tempdir().unwrap();
    let db = JsonVault::open(dir.path()).unwrap();
    db.set("a", 1).unwrap();
    db.flush().unwrap();
    assert!(!db.path().with_extension("json.tmp").exists());
}
