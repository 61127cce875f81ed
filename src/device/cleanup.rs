use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

const REMOVE_RETRIES: u32 = 3;
const REMOVE_RETRY_PAUSE: Duration = Duration::from_millis(100);

/// Best-effort sweep of the device storage directory: everything not on the
/// allow-lists is removed. Doomed directories are emptied one level deep
/// and then dropped. Individual failures are skipped, never fatal.
pub fn cleanup_storage(root: &Path, keep_dirs: &[&str], keep_files: &[&str]) {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cleanup: cannot list {}: {e}", root.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(name) => name,
            None => continue,
        };
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            if keep_dirs.contains(&name) {
                continue;
            }
            if let Ok(children) = fs::read_dir(&path) {
                for child in children.flatten() {
                    let _ = fs::remove_file(child.path());
                }
            }
            if fs::remove_dir(&path).is_ok() {
                debug!("cleanup: removed directory {}", path.display());
            }
        } else {
            if keep_files.contains(&name) {
                continue;
            }
            if fs::remove_file(&path).is_ok() {
                debug!("cleanup: removed {}", path.display());
            }
        }
    }
}

/// Remove `path` with a few retries; true once the file is gone.
pub fn safe_remove(path: &Path) -> bool {
    for attempt in 1..=REMOVE_RETRIES {
        if !path.exists() {
            return true;
        }
        match fs::remove_file(path) {
            Ok(()) => return true,
            Err(e) => {
                debug!("remove retry {attempt}/{REMOVE_RETRIES}: {e}");
                thread::sleep(REMOVE_RETRY_PAUSE);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn sweep_keeps_only_allowed_entries() {
        let dir = TempDir::new("pixframe-cleanup").unwrap();
        fs::write(dir.path().join("img.jpg"), b"keep").unwrap();
        fs::write(dir.path().join("leftover.tmp"), b"drop").unwrap();
        fs::create_dir(dir.path().join("cache")).unwrap();
        fs::write(dir.path().join("cache/blob"), b"drop").unwrap();
        fs::create_dir(dir.path().join("res")).unwrap();

        cleanup_storage(dir.path(), &["res"], &["img.jpg"]);

        assert!(dir.path().join("img.jpg").exists());
        assert!(dir.path().join("res").exists());
        assert!(!dir.path().join("leftover.tmp").exists());
        assert!(!dir.path().join("cache").exists());
    }

    #[test]
    fn safe_remove_succeeds_on_absent_files() {
        let dir = TempDir::new("pixframe-cleanup").unwrap();
        assert!(safe_remove(&dir.path().join("never-existed")));
    }

    #[test]
    fn safe_remove_deletes_existing_files() {
        let dir = TempDir::new("pixframe-cleanup").unwrap();
        let path = dir.path().join("stale.jpg");
        fs::write(&path, b"stale").unwrap();
        assert!(safe_remove(&path));
        assert!(!path.exists());
    }
}
