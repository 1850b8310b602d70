//! The database type, its handle, and its builder.

use crate::backup::{self, DEFAULT_BACKUP_INTERVAL};
use crate::error::{Error, Result};
use crate::flush::{DebounceWorker, FlushPolicy, IntervalWorker};
use crate::ops::{self, Operation};
use crate::persist::{atomic_write, ensure_file, load, temp_path};
use crate::serializer::JsonSerializer;
use crate::store::{Entry, Store};
use crate::transaction;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

/// Directory used by [`JsonVaultBuilder::default_dir`].
pub const DEFAULT_DATA_DIR: &str = "json-vault";

/// Backing file name used unless the builder says otherwise.
pub const DEFAULT_FILE_NAME: &str = "database.json";

/// Embedded key-value database backed by one JSON file.
///
/// Reads and writes hit the in-memory [`Store`]; the file is rewritten
/// according to the [`FlushPolicy`]. Every operation takes the same lock for
/// its whole duration, so a transaction or a read-modify-write like
/// [`add`](Self::add) is never observed half done.
///
/// You normally hold a [`JsonVaultHandle`], which derefs to this type.
pub struct JsonVault {
    pub(crate) core: Arc<Core>,
    pub(crate) policy: FlushPolicy,
    pub(crate) trigger: Mutex<Option<mpsc::Sender<()>>>,
}

/// State shared with the background workers.
pub(crate) struct Core {
    state: Mutex<State>,
    path: PathBuf,
    data_dir: PathBuf,
    serializer: JsonSerializer,
    flushes: AtomicU64,
}

struct State {
    store: Store,
    dirty: bool,
}

impl Core {
    /// Serialize and write if dirty. `Ok(true)` means a write happened.
    fn flush(&self) -> Result<bool> {
        let mut state = self.state.lock();
        if !state.dirty {
            return Ok(false);
        }
        let bytes = self.serializer.serialize(state.store.as_map())?;
        atomic_write(&self.path, &bytes)?;
        state.dirty = false;
        self.flushes.fetch_add(1, Ordering::Relaxed);
        log::debug!("flushed {} keys to {}", state.store.len(), self.path.display());
        Ok(true)
    }

    fn backup(&self, name: &str) -> Result<PathBuf> {
        let path = backup::backup_path(&self.data_dir, name)?;
        // only the flush path may write the backing file
        if path == self.path || path == temp_path(&self.path) {
            return Err(Error::InvalidArgument(format!(
                "backup name '{name}' would overwrite the backing file {}",
                self.path.display()
            )));
        }
        let bytes = {
            let state = self.state.lock();
            self.serializer.serialize(state.store.as_map())?
        };
        std::fs::write(&path, bytes)
            .map_err(|e| Error::Io(format!("writing backup {}: {e}", path.display())))?;
        Ok(path)
    }
}

impl JsonVault {
    /// Open (or create) a vault in `data_dir` with default settings:
    /// `database.json`, 500ms debounce, pretty JSON, no auto-backup.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<JsonVaultHandle> {
        Self::builder(data_dir).build()
    }

    /// Start configuring a vault. Call [`.build()`](JsonVaultBuilder::build)
    /// when ready.
    pub fn builder(data_dir: impl AsRef<Path>) -> JsonVaultBuilder {
        JsonVaultBuilder::new(data_dir)
    }

    // ---- reads ----

    /// Value for `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.core.state.lock().store.get(key)?.cloned())
    }

    /// `true` if the key exists.
    pub fn has(&self, key: &str) -> Result<bool> {
        self.core.state.lock().store.has(key)
    }

    /// Entries in insertion order; at most `limit` of them when `limit > 0`.
    #[must_use]
    pub fn all(&self, limit: usize) -> Vec<Entry> {
        self.core.state.lock().store.entries(limit)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.state.lock().store.len()
    }

    /// `true` when the vault has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.core.path
    }

    /// Directory holding the backing file and backups.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.core.data_dir
    }

    /// The flush policy this vault was built with.
    #[must_use]
    pub fn policy(&self) -> &FlushPolicy {
        &self.policy
    }

    /// `true` while there are mutations not yet written to disk.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.core.state.lock().dirty
    }

    /// Successful writes to the backing file since open.
    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.core.flushes.load(Ordering::Relaxed)
    }

    // ---- writes ----

    /// Overwrite `key`. Returns the stored value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<Value> {
        let key = key.into();
        let value = value.into();
        self.mutate(|store| ops::set(store, &key, value))
    }

    /// Remove `key`, returning its value. Fails with [`Error::NotFound`] if it
    /// isn't there.
    pub fn delete(&self, key: &str) -> Result<Value> {
        self.mutate(|store| ops::delete(store, key))
    }

    /// Add `delta` to the number at `key`; an absent key starts at 0.
    pub fn add(&self, key: &str, delta: impl Into<Value>) -> Result<Value> {
        let delta = delta.into();
        self.mutate(|store| ops::add(store, key, &delta))
    }

    /// Subtract `delta` from the number at `key`; an absent key starts at 0.
    pub fn subtract(&self, key: &str, delta: impl Into<Value>) -> Result<Value> {
        let delta = delta.into();
        self.mutate(|store| ops::subtract(store, key, &delta))
    }

    /// `current <operator> operand` for an existing numeric key. `operator`
    /// is one of `+ - * / %`.
    pub fn math(&self, key: &str, operator: &str, operand: impl Into<Value>) -> Result<Value> {
        let operand = operand.into();
        self.mutate(|store| ops::math(store, key, operator, &operand))
    }

    /// Append to the array at `key` (created if absent). Returns the array.
    pub fn push(&self, key: &str, value: impl Into<Value>) -> Result<Vec<Value>> {
        let value = value.into();
        self.mutate(|store| ops::push(store, key, value))
    }

    /// Apply `operations` as one unit. Either all of them take effect or,
    /// on the first failure, none do and the error comes back as
    /// [`Error::TransactionFailed`]. A successful batch marks the vault dirty
    /// once.
    pub fn transaction(&self, operations: &[Operation]) -> Result<()> {
        if operations.is_empty() {
            return Ok(());
        }
        self.mutate(|store| {
            *store = transaction::apply(store, operations)?;
            Ok(())
        })?;
        log::debug!("committed transaction of {} operations", operations.len());
        Ok(())
    }

    /// Drop every key and write the empty store out right away.
    pub fn reset(&self) -> Result<()> {
        self.mutate(|store| {
            store.clear();
            Ok(())
        })?;
        self.flush()
    }

    // ---- persistence ----

    /// Write the store to disk now if it has unflushed changes. On failure the
    /// vault stays dirty so a later flush can retry.
    pub fn flush(&self) -> Result<()> {
        self.core.flush().map(|_| ())
    }

    /// Write the current in-memory contents to `<data_dir>/<name>.json`.
    /// Returns the path written.
    pub fn backup(&self, name: &str) -> Result<PathBuf> {
        let path = self.core.backup(name)?;
        log::info!("backup written to {}", path.display());
        Ok(path)
    }

    // ---- internal ----

    fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Store) -> Result<T>,
    {
        let out = {
            let mut state = self.core.state.lock();
            let out = f(&mut state.store)?;
            state.dirty = true;
            out
        };
        self.mark_dirty();
        Ok(out)
    }

    fn mark_dirty(&self) {
        if let FlushPolicy::Debounce(_) = self.policy {
            if let Some(tx) = self.trigger.lock().as_ref() {
                let _ = tx.send(());
            }
        }
    }
}

impl std::fmt::Debug for JsonVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonVault")
            .field("path", &self.core.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`JsonVault`].
///
/// ```rust,no_run
/// use json_vault::JsonVault;
/// use std::time::Duration;
///
/// let db = JsonVault::builder("data")
///     .file_name("settings.json")
///     .debounce(Duration::from_millis(250))
///     .auto_backup(Duration::from_secs(300))
///     .build()
///     .unwrap();
/// db.set("theme", "dark").unwrap();
/// ```
pub struct JsonVaultBuilder {
    data_dir: PathBuf,
    file_name: String,
    policy: FlushPolicy,
    auto_backup: Option<Duration>,
    pretty: bool,
}

impl JsonVaultBuilder {
    fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            file_name: DEFAULT_FILE_NAME.to_owned(),
            policy: FlushPolicy::default(),
            auto_backup: None,
            pretty: true,
        }
    }

    /// Builder rooted at [`DEFAULT_DATA_DIR`], relative to the working
    /// directory.
    pub fn default_dir() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }

    /// Name of the backing file inside the data directory (default:
    /// `database.json`).
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Set the flush policy (default: 500ms debounce).
    pub fn policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shorthand for `policy(FlushPolicy::Debounce(quiet))`.
    pub fn debounce(self, quiet: Duration) -> Self {
        self.policy(FlushPolicy::Debounce(quiet))
    }

    /// Write a timestamped backup every `interval`.
    pub fn auto_backup(mut self, interval: Duration) -> Self {
        self.auto_backup = Some(interval);
        self
    }

    /// Auto-backup at the default 60s interval.
    pub fn auto_backup_default(self) -> Self {
        self.auto_backup(DEFAULT_BACKUP_INTERVAL)
    }

    /// Pretty JSON with 2-space indentation (default) or compact.
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Create the directory and file if needed, load the store, and start the
    /// background workers.
    pub fn build(self) -> Result<JsonVaultHandle> {
        if self.file_name.is_empty() || self.file_name.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "file name '{}' must be a plain, non-empty file name",
                self.file_name
            )));
        }
        if self.auto_backup == Some(Duration::ZERO) {
            return Err(Error::Config("auto-backup interval must be non-zero".into()));
        }

        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::compact()
        };

        let path = self.data_dir.join(&self.file_name);
        ensure_file(&self.data_dir, &path)?;
        let store = Store::from_map(load(&path, &serializer)?);
        log::info!("opened {} with {} keys", path.display(), store.len());

        let core = Arc::new(Core {
            state: Mutex::new(State {
                store,
                dirty: false,
            }),
            path,
            data_dir: self.data_dir,
            serializer,
            flushes: AtomicU64::new(0),
        });

        let (debounce, trigger) = match &self.policy {
            FlushPolicy::Debounce(quiet) => {
                let (tx, rx) = mpsc::channel();
                let core_ref = Arc::clone(&core);
                let w = DebounceWorker::start(
                    *quiet,
                    move || {
                        if let Err(e) = core_ref.flush() {
                            let path = core_ref.path.display();
                            log::error!("debounced flush of {path} failed: {e}");
                        }
                    },
                    rx,
                );
                (Some(w), Some(tx))
            }
            FlushPolicy::Manual => (None, None),
        };

        let backups = self.auto_backup.map(|interval| {
            let core_ref = Arc::clone(&core);
            IntervalWorker::start(interval, move || {
                let name = backup::auto_backup_name(chrono::Utc::now());
                match core_ref.backup(&name) {
                    Ok(path) => log::info!("auto-backup written to {}", path.display()),
                    Err(e) => log::error!("auto-backup failed: {e}"),
                }
            })
        });

        let vault = JsonVault {
            core,
            policy: self.policy,
            trigger: Mutex::new(trigger),
        };

        Ok(JsonVaultHandle {
            inner: vault,
            debounce,
            backups,
            closed: false,
        })
    }
}

impl std::fmt::Debug for JsonVaultBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonVaultBuilder")
            .field("data_dir", &self.data_dir)
            .field("file_name", &self.file_name)
            .field("policy", &self.policy)
            .field("auto_backup", &self.auto_backup)
            .field("pretty", &self.pretty)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owns the vault and its background workers.
///
/// Derefs to [`JsonVault`] so you can call vault methods directly on it.
/// Dropping it shuts down like [`destroy`](Self::destroy) does, except a
/// failed final flush can only be logged.
pub struct JsonVaultHandle {
    inner: JsonVault,
    debounce: Option<DebounceWorker>,
    backups: Option<IntervalWorker>,
    closed: bool,
}

impl JsonVaultHandle {
    /// Orderly shutdown: cancel the pending debounce and the auto-backup
    /// timer, then flush whatever is still dirty.
    pub fn destroy(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // disconnecting the trigger is what stops the debounce thread
        drop(self.inner.trigger.lock().take());
        drop(self.debounce.take());
        drop(self.backups.take());

        let res = self.inner.flush();
        match &res {
            Ok(()) => log::info!("closed {}", self.inner.path().display()),
            Err(e) => log::error!("final flush of {} failed: {e}", self.inner.path().display()),
        }
        res
    }
}

impl std::ops::Deref for JsonVaultHandle {
    type Target = JsonVault;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Drop for JsonVaultHandle {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl std::fmt::Debug for JsonVaultHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}
