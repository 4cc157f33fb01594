use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Find note files below `root`, identified by a file name ending in `extension`.
///
/// `root` may also name a single file, which is returned as is. The result is
/// sorted so runs process files in a stable order.
pub fn find_note_files(root: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        bail!("Expected to find note files under {}, but it does not exist", root.display());
    }

    let mut paths = Vec::new();
    for entry in walkdir::WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let is_note = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(extension) && name.len() > extension.len());
        if entry.file_type().is_file() && is_note {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    debug!(count = paths.len(), ?root, extension, "Discovered note files");
    Ok(paths)
}
