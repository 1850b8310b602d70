use json_vault::{Error, JsonVault, Operation};

fn main() -> Result<(), Error> {
    let dir = std::env::temp_dir().join("json_vault_example_transaction");
    let db = JsonVault::open(&dir)?;

    db.set("balance", 100)?;

    db.transaction(&[
        Operation::subtract("balance", 30),
        Operation::push("ledger", "-30"),
    ])?;
    println!("after transfer: {:?}", db.get("balance")?);

    // the last step fails, so neither the subtract nor the push sticks
    let res = db.transaction(&[
        Operation::subtract("balance", 500),
        Operation::push("ledger", "-500"),
        Operation::delete("approval"),
    ]);
    if let Err(Error::TransactionFailed { index, source }) = &res {
        println!("rolled back at step {index}: {source}");
    }
    println!("balance is still {:?}", db.get("balance")?);
    println!("ledger  is still {:?}", db.get("ledger")?);

    db.destroy()?;
    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
