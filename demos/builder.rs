use json_vault::JsonVault;
use std::time::Duration;

fn main() -> Result<(), json_vault::Error> {
    let dir = std::env::temp_dir().join("json_vault_example_builder");

    // short debounce, compact JSON, a backup every two seconds
    let db = JsonVault::builder(&dir)
        .file_name("settings.json")
        .debounce(Duration::from_millis(100))
        .pretty(false)
        .auto_backup(Duration::from_secs(2))
        .build()?;

    for i in 0..1_000 {
        db.set(format!("key{i}"), i)?;
    }
    std::thread::sleep(Duration::from_millis(300));
    println!("1000 sets cost {} write(s)", db.flush_count());

    let snap = db.backup("before-cleanup")?;
    println!("backup at {}", snap.display());

    println!("\nDebug output: {db:?}");
    db.destroy()?;

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
