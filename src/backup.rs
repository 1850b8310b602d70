//! Backup file naming.

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

/// Default auto-backup interval when enabled without an explicit one.
pub const DEFAULT_BACKUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// `<dir>/<name>.json`. The name has to be a plain file stem so the backup
/// can't land outside the data directory.
pub fn backup_path(dir: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("backup name must be non-empty".into()));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::InvalidArgument(format!(
            "backup name '{name}' must not contain path separators"
        )));
    }
    Ok(dir.join(format!("{name}.json")))
}

/// Name for an automatic backup taken at `at`: `backup-` followed by the
/// ISO-8601 timestamp with `:` and `.` swapped for `-`.
pub fn auto_backup_name(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("backup-{stamp}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn auto_name_has_no_colons_or_dots() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(auto_backup_name(at), "backup-2024-03-09T14-05-07-042Z");
    }

    #[test]
    fn path_is_name_dot_json_in_dir() {
        let p = backup_path(Path::new("/data"), "nightly").unwrap();
        assert_eq!(p, Path::new("/data/nightly.json"));
    }

    #[test]
    fn bad_names_are_rejected() {
        for name in ["", "../escape", "a/b", "a\\b", ".."] {
            assert!(
                matches!(backup_path(Path::new("d"), name), Err(Error::InvalidArgument(_))),
                "{name:?}"
            );
        }
    }
}
