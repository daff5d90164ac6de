//! Time series of network files
//!
//! A tracked experiment stores one position file and one contact file per
//! time step, in two directories. Frames are paired by sorted file name.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const TABLE_EXTENSIONS: [&str; 2] = ["txt", "csv"];

/// Table files (`.txt`, `.csv`) directly inside `dir`, sorted by file name
pub fn sorted_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_table = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| TABLE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_table {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), files = files.len(), "table files listed");
    Ok(files)
}

/// Pair the i-th position file with the i-th contact file.
///
/// Both directories must hold the same number of table files.
pub fn frame_files<P: AsRef<Path>, Q: AsRef<Path>>(
    positions_dir: P,
    contacts_dir: Q,
) -> Result<Vec<(PathBuf, PathBuf)>> {
    let positions = sorted_files(&positions_dir)?;
    let contacts = sorted_files(&contacts_dir)?;
    if positions.len() != contacts.len() {
        return Err(Error::InvalidParameter {
            name: "contacts_dir",
            value: contacts_dir.as_ref().display().to_string(),
            reason: format!(
                "{} contact files for {} position files",
                contacts.len(),
                positions.len()
            ),
        });
    }
    Ok(positions.into_iter().zip(contacts).collect())
}
