//! Disk I/O helpers: bootstrap, load, and the temp-file + rename write.
//!
//! The rename-over approach is close to atomic on most platforms but it is
//! not a durability guarantee: there is no fsync and no journal. Keep backups
//! if that matters.

use crate::error::{Error, Result};
use crate::serializer::JsonSerializer;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Create `dir` (recursively) and an empty `{}` document at `path` if either
/// is missing.
pub fn ensure_file(dir: &Path, path: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| Error::Io(format!("creating {}: {e}", dir.display())))?;
    if !path.exists() {
        std::fs::write(path, b"{}")
            .map_err(|e| Error::Io(format!("creating {}: {e}", path.display())))?;
        log::debug!("created empty backing file {}", path.display());
    }
    Ok(())
}

/// Read and decode the backing file.
///
/// A missing or empty file is an empty map. A file that doesn't parse as a
/// JSON object is also treated as empty, with a warning; it gets overwritten
/// by the next flush.
pub fn load(path: &Path, serializer: &JsonSerializer) -> Result<Map<String, Value>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(Error::Io(format!("reading {}: {e}", path.display()))),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serializer.deserialize(&bytes) {
        Ok(map) => Ok(map),
        Err(e) => {
            log::warn!(
                "backing file {} is not a valid JSON object ({e}); starting with an empty store",
                path.display()
            );
            Ok(Map::new())
        }
    }
}

/// `<path>.tmp`, the scratch file [`atomic_write`] renames over `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    path.with_extension(format!("{ext}.tmp"))
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`, so a crash
/// mid-write leaves the previous file in place.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes).map_err(|e| Error::Io(format!("writing {}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| Error::Io(format!("renaming onto {}: {e}", path.display())))?;
    Ok(())
}
