use crate::utils::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect candidate `.jar` archives from `dir`, optionally descending into
/// subdirectories. Output is sorted so batches are deterministic.
pub fn find_archive_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if recursive {
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() && has_jar_extension(path) {
                files.push(path.to_path_buf());
            }
        }
    } else {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_jar_extension(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn has_jar_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("jar")
}
