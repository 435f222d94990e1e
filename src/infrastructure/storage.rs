use std::fs;
use std::path::{Path, PathBuf};

/// Make sure the directory holding the database file exists.
pub fn ensure_database_dir(database_path: &Path) -> std::io::Result<Option<PathBuf>> {
    match database_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            ensure_dir(parent)?;
            Ok(Some(parent.to_path_buf()))
        }
        _ => Ok(None),
    }
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
