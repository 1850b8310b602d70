use json_vault::JsonVault;

fn main() -> Result<(), json_vault::Error> {
    let dir = std::env::temp_dir().join("json_vault_example_basic");

    let db = JsonVault::open(&dir)?;

    db.set("name", "json-vault")?;
    db.add("launches", 1)?;
    db.push("tags", "embedded")?;
    db.push("tags", "json")?;

    println!("name     = {:?}", db.get("name")?);
    println!("launches = {:?}", db.get("launches")?);
    println!("tags     = {:?}", db.get("tags")?);

    match db.delete("does-not-exist") {
        Err(e) => println!("delete of a missing key: {e}"),
        Ok(v) => println!("unexpectedly removed {v}"),
    }

    for entry in db.all(0) {
        println!("{} => {}", entry.key, entry.value);
    }

    // cancels the pending debounce and writes everything out
    db.destroy()?;

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
