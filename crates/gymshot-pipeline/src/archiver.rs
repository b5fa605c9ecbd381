use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Moves processed images out of the pending directory.
///
/// Each file is moved independently; a failure is logged and recorded but
/// does not stop the rest of the batch. There is no rollback, so a partially
/// archived batch leaves the failed files pending.
#[derive(Debug, Clone)]
pub struct Archiver {
    dir: PathBuf,
}

/// Result of archiving one batch.
#[derive(Debug, Default)]
pub struct ArchiveReport {
    /// Destination paths of the files that were moved.
    pub moved: Vec<PathBuf>,
    /// Source paths that could not be moved, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl ArchiveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Archiver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Move every path into the target directory, keeping its file name.
    /// The directory is created on first use.
    pub fn archive(&self, paths: &[PathBuf]) -> ArchiveReport {
        let mut report = ArchiveReport::default();

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "failed to create archive directory");
            report.failed = paths.iter().map(|p| (p.clone(), e.to_string())).collect();
            return report;
        }

        for path in paths {
            let Some(file_name) = path.file_name() else {
                warn!(path = %path.display(), "path has no file name, skipping");
                report.failed.push((path.clone(), "path has no file name".into()));
                continue;
            };
            let dest = self.dir.join(file_name);
            match relocate(path, &dest) {
                Ok(()) => {
                    info!(from = %path.display(), to = %dest.display(), "moved image");
                    report.moved.push(dest);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to move image");
                    report.failed.push((path.clone(), e.to_string()));
                }
            }
        }

        report
    }
}

/// Rename, falling back to copy + delete across filesystems.
fn relocate(src: &Path, dest: &Path) -> io::Result<()> {
    match std::fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            std::fs::copy(src, dest)?;
            std::fs::remove_file(src)
        }
        Err(e) => Err(e),
    }
}
