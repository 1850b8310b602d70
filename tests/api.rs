use json_vault::{Error, FlushPolicy, JsonVault};
use serde_json::json;
use tempfile::tempdir;

fn manual(dir: &std::path::Path) -> json_vault::JsonVaultHandle {
    JsonVault::builder(dir)
        .policy(FlushPolicy::Manual)
        .build()
        .unwrap()
}

// ---- set / get / has --------------------------------------------------------

#[test]
fn set_then_get_returns_value() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    for (k, v) in [
        ("s", json!("text")),
        ("n", json!(1.25)),
        ("b", json!(false)),
        ("z", json!(null)),
        ("a", json!([1, [2, 3]])),
        ("o", json!({"deep": {"er": 1}})),
    ] {
        assert_eq!(db.set(k, v.clone()).unwrap(), v);
        assert_eq!(db.get(k).unwrap(), Some(v));
    }
    assert_eq!(db.len(), 6);
}

#[test]
fn get_missing_is_none() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    assert_eq!(db.get("nope").unwrap(), None);
    assert!(!db.has("nope").unwrap());
}

#[test]
fn empty_key_is_invalid_argument() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    assert!(matches!(db.get(""), Err(Error::InvalidArgument(_))));
    assert!(matches!(db.set("", 1), Err(Error::InvalidArgument(_))));
    assert!(matches!(db.add("", 1), Err(Error::InvalidArgument(_))));
    assert!(!db.is_dirty());
}

// ---- delete -----------------------------------------------------------------

#[test]
fn delete_absent_is_not_found() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    assert_eq!(db.delete("ghost"), Err(Error::NotFound("ghost".into())));
    assert!(!db.is_dirty());
}

#[test]
fn delete_present_removes_it() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    db.set("k", "v").unwrap();
    assert_eq!(db.delete("k").unwrap(), json!("v"));
    assert!(!db.has("k").unwrap());
}

// ---- numeric helpers --------------------------------------------------------

#[test]
fn add_on_absent_then_accumulate() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    assert_eq!(db.add("k", 5).unwrap(), json!(5));
    assert_eq!(db.add("k", 3).unwrap(), json!(8));
    assert_eq!(db.subtract("k", 10).unwrap(), json!(-2));
}

#[test]
fn add_with_non_numeric_delta() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    assert!(matches!(db.add("k", "five"), Err(Error::InvalidArgument(_))));
    assert!(!db.has("k").unwrap());
}

#[test]
fn math_divide_by_zero_keeps_value() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    db.set("k", 12).unwrap();
    db.flush().unwrap();
    assert_eq!(db.math("k", "/", 0), Err(Error::DivisionByZero));
    assert_eq!(db.get("k").unwrap(), Some(json!(12)));
    assert!(!db.is_dirty());
}

#[test]
fn math_on_absent_key() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    assert_eq!(db.math("k", "*", 2), Err(Error::NotFound("k".into())));
}

#[test]
fn math_bad_operator() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    db.set("k", 2).unwrap();
    assert!(matches!(db.math("k", "**", 2), Err(Error::InvalidArgument(_))));
    assert_eq!(db.math("k", "*", 2).unwrap(), json!(4));
}

// ---- push -------------------------------------------------------------------

#[test]
fn push_on_absent_creates_array() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    assert_eq!(db.push("l", "x").unwrap(), vec![json!("x")]);
    assert_eq!(db.push("l", 2).unwrap(), vec![json!("x"), json!(2)]);
    assert_eq!(db.get("l").unwrap(), Some(json!(["x", 2])));
}

#[test]
fn push_on_non_array_is_type_mismatch() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    db.set("l", json!({"not": "an array"})).unwrap();
    assert!(matches!(db.push("l", 1), Err(Error::TypeMismatch(_))));
    assert_eq!(db.get("l").unwrap(), Some(json!({"not": "an array"})));
}

// ---- all / reset ------------------------------------------------------------

#[test]
fn all_respects_limit_and_order() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    for i in 0..5 {
        db.set(format!("k{i}"), i).unwrap();
    }
    let all = db.all(0);
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].key, "k0");
    assert_eq!(all[4].value, json!(4));

    let some = db.all(2);
    assert_eq!(
        some.iter().map(|e| e.key.as_str()).collect::<Vec<_>>(),
        vec!["k0", "k1"]
    );
}

#[test]
fn reset_clears_memory_and_disk() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    db.set("a", 1).unwrap();
    db.flush().unwrap();
    db.reset().unwrap();
    assert!(db.is_empty());
    assert!(!db.is_dirty());
    let raw = std::fs::read_to_string(db.path()).unwrap();
    assert_eq!(raw.trim(), "{}");
}

// ---- builder / debug --------------------------------------------------------

#[test]
fn builder_rejects_bad_config() {
    let dir = tempdir().unwrap();
    let err = JsonVault::builder(dir.path()).file_name("").build().unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let err = JsonVault::builder(dir.path())
        .auto_backup(std::time::Duration::ZERO)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn builder_custom_file_name() {
    let dir = tempdir().unwrap();
    let db = JsonVault::builder(dir.path())
        .file_name("settings.json")
        .build()
        .unwrap();
    assert_eq!(db.path(), dir.path().join("settings.json"));
    assert_eq!(db.data_dir(), dir.path());
    assert!(db.path().exists());
}

#[test]
fn debug_impls_dont_panic() {
    let dir = tempdir().unwrap();
    let handle = manual(dir.path());

    let dbg_vault = format!("{:?}", *handle);
    assert!(dbg_vault.contains("JsonVault"));
    assert!(dbg_vault.contains("path"));

    let dbg_handle = format!("{:?}", handle);
    assert!(dbg_handle.contains("JsonVault"));

    let builder = JsonVault::builder(dir.path());
    assert!(format!("{:?}", builder).contains("JsonVaultBuilder"));
}

#[test]
fn vault_is_shareable_across_threads() {
    let dir = tempdir().unwrap();
    let db = manual(dir.path());
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..250 {
                    db.add("counter", 1).unwrap();
                }
            });
        }
    });
    assert_eq!(db.get("counter").unwrap(), Some(json!(1000)));
}
