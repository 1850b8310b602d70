//! Embedded key-value store backed by a single JSON file.
//!
//! Everything lives in memory; the file is rewritten once a burst of
//! mutations has gone quiet (debounce), on an explicit flush, and on
//! shutdown. On top of plain get/set there are numeric helpers, array push,
//! all-or-nothing transactions, and backups.
//!
//! ```rust,no_run
//! use json_vault::{JsonVault, Operation};
//!
//! let db = JsonVault::open("data").unwrap();
//! db.set("visits", 0).unwrap();
//! db.add("visits", 1).unwrap();
//! db.push("tags", "new").unwrap();
//! db.transaction(&[
//!     Operation::math("visits", "*", 10),
//!     Operation::set("seen", true),
//! ]).unwrap();
//! db.destroy().unwrap(); // cancels timers, final flush
//! ```
//!
//! **Single-process only.** If multiple processes open the same file they will
//! clobber each other, last writer wins.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod backup;
pub mod error;
pub mod flush;
pub mod ops;
pub mod persist;
pub mod serializer;
pub mod store;
pub mod transaction;
pub mod vault;

pub use error::{Error, Result};
pub use flush::FlushPolicy;
pub use ops::{MathOp, Operation};
pub use store::{Entry, Store};
pub use vault::{JsonVault, JsonVaultBuilder, JsonVaultHandle};
