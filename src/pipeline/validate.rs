use crate::utils::MAX_FILE_SIZE;
use std::path::Path;

/// Submission preconditions for one archive. Pure and idempotent, safe to
/// call from any number of workers.
pub fn validate_archive(path: &Path) -> (bool, String) {
    if !path.exists() {
        return (false, format!("file does not exist: {}", path.display()));
    }

    let size = match path.metadata() {
        Ok(metadata) => metadata.len(),
        Err(e) => return (false, format!("cannot stat {}: {e}", path.display())),
    };

    if size == 0 {
        return (false, format!("file is empty: {}", path.display()));
    }

    if size > MAX_FILE_SIZE {
        return (
            false,
            format!(
                "file too large (> {}MB): {}",
                MAX_FILE_SIZE / 1024 / 1024,
                path.display()
            ),
        );
    }

    if path.extension().and_then(|ext| ext.to_str()) != Some("jar") {
        return (
            false,
            format!("wrong extension (.jar required): {}", path.display()),
        );
    }

    (true, String::new())
}
