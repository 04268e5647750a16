use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FibregError, Result};
use crate::frame::Frame;

use super::image_io::load_frame;

/// Ordered list of slice files belonging to one stack.
///
/// Order is the lexicographic order of file names, which the acquisition
/// software keeps equal to depth order. Stages write their output under the
/// same file names, so a sequence can be carried from one directory to the
/// next with [`FileSequence::rebased`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSequence {
    directory: PathBuf,
    files: Vec<PathBuf>,
}

impl FileSequence {
    /// List the slices of `directory` with the given extension and keep the
    /// half-open index range `[start, end)`.
    ///
    /// Out-of-range indices are clamped to the listing, so an over-long range
    /// simply yields fewer (possibly zero) slices.
    pub fn resolve(
        directory: &Path,
        extension: &str,
        start: usize,
        end: Option<usize>,
    ) -> Result<Self> {
        if let Some(end) = end {
            if end <= start {
                return Err(FibregError::InvalidRange { start, end });
            }
        }
        if !directory.is_dir() {
            return Err(FibregError::DirectoryNotFound {
                path: directory.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();
            if path.is_file() && matches_extension(&path, extension) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let total = files.len();
        let end = end.unwrap_or(total).min(total);
        let start = start.min(end);
        let files: Vec<PathBuf> = files.drain(start..end).collect();

        debug!(
            directory = %directory.display(),
            total,
            selected = files.len(),
            "Resolved slice sequence"
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            files,
        })
    }

    /// The same file names, located in `destination`.
    pub fn rebased(&self, destination: &Path) -> Self {
        let files = self
            .files
            .iter()
            .filter_map(|p| p.file_name().map(|name| destination.join(name)))
            .collect();
        Self {
            directory: destination.to_path_buf(),
            files,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.files.get(index).map(PathBuf::as_path)
    }

    /// Load slice `index` from disk.
    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        let path = self.files.get(index).ok_or_else(|| {
            FibregError::InvalidConfig(format!(
                "slice index {index} out of range (total: {})",
                self.files.len()
            ))
        })?;
        load_frame(path, index)
    }

    /// Indices paired with paths, for handing to a worker pool.
    pub fn indexed(&self) -> Vec<(usize, &Path)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.as_path()))
            .collect()
    }
}

/// Case-insensitive extension match; `tif` and `tiff` are interchangeable.
fn matches_extension(path: &Path, extension: &str) -> bool {
    let wanted = normalize_extension(extension.trim_start_matches('.'));
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| normalize_extension(ext) == wanted)
        .unwrap_or(false)
}

fn normalize_extension(ext: &str) -> String {
    let lower = ext.to_ascii_lowercase();
    if lower == "tiff" {
        "tif".to_string()
    } else {
        lower
    }
}

/// Create `path` (and parents) if it does not exist yet.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
