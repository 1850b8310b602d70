//! All-or-nothing batches of mutations.
//!
//! The batch runs against a clone of the store. Only a fully successful run
//! gets swapped in, so rollback is just dropping the clone.

use crate::error::{Error, Result};
use crate::ops::Operation;
use crate::store::Store;

/// Run `operations` in order against a copy of `store` and return the copy.
///
/// The first failure aborts the batch with [`Error::TransactionFailed`]
/// carrying its position and cause; `store` itself is never touched.
pub fn apply(store: &Store, operations: &[Operation]) -> Result<Store> {
    let mut scratch = store.clone();
    for (index, op) in operations.iter().enumerate() {
        if let Err(err) = op.apply(&mut scratch) {
            log::debug!("transaction aborted at operation {index} ({}): {err}", op.key());
            return Err(Error::TransactionFailed {
                index,
                source: Box::new(err),
            });
        }
    }
    Ok(scratch)
}
