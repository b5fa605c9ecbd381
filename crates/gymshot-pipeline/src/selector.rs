use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions accepted as screenshots (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Return up to `batch_size` image paths from `dir`, sorted by file name.
///
/// A missing or unreadable directory yields an empty batch, which the caller
/// treats as "nothing left to do".
pub fn select_batch(dir: &Path, batch_size: usize) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "pending directory not found");
            return vec![];
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to list pending directory");
            return vec![];
        }
    };

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    images.truncate(batch_size);

    debug!(dir = %dir.display(), selected = images.len(), "selected batch");
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        assert!(is_supported_image(Path::new("a.PNG")));
        assert!(is_supported_image(Path::new("dir/b.JpEg")));
        assert!(is_supported_image(Path::new("c.webp")));
        assert!(!is_supported_image(Path::new("d.gif")));
        assert!(!is_supported_image(Path::new("png")));
        assert!(!is_supported_image(Path::new(".png.txt")));
    }
}
