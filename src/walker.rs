//! Finding candidate images.
//!
//! Two passes read the filesystem:
//!
//! - [`discover`]: the main pass. Lists the top level of the source directory
//!   only. Subdirectories are never entered.
//! - [`sweep`]: the safety net. Walks the whole target tree after the main pass
//!   and moves any image still over the ceiling into the incompatible folder,
//!   as is. The destination folders are pruned before descending, so nothing
//!   already routed is looked at twice.

use crate::config::PipelineConfig;
use crate::layout::{Destination, TargetLayout};
use crate::router::{FileReport, Outcome};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Accepted extensions, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff"];

/// True when `path` has one of the accepted image extensions.
pub fn is_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// List candidate image files directly inside `source`, sorted by name.
///
/// Directories are skipped, as is anything inside the destination folders
/// (relevant when the source and target directories are the same).
pub fn discover(source: &Path, layout: &TargetLayout) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(source)? {
        let path = entry?.path();
        if !path.is_file() || layout.contains(&path) {
            continue;
        }
        if is_candidate(&path) {
            files.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-image");
        }
    }
    files.sort();
    Ok(files)
}

/// Move every image under the target tree that is still over the ceiling into
/// the incompatible folder. No reduction is attempted.
///
/// Paths in `skip` are left alone; the main pass already reported them.
/// Unreadable directories are logged and skipped. A file that cannot be moved
/// is reported as failed; the sweep carries on.
pub fn sweep(
    layout: &TargetLayout,
    config: &PipelineConfig,
    skip: &HashSet<PathBuf>,
) -> Vec<FileReport> {
    let mut reports = Vec::new();
    let walker = WalkDir::new(layout.root())
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !layout.contains(e.path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "sweep could not read entry");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_candidate(path) {
            continue;
        }
        if skip.contains(path) {
            debug!(path = %path.display(), "already reported, not sweeping");
            continue;
        }
        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "sweep could not stat file");
                continue;
            }
        };
        if size <= config.max_bytes {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        reports.push(match layout.place(path, Destination::Incompatible, &name) {
            Ok(dest) => {
                info!(path = %path.display(), size, dest = %dest.display(), "swept oversized leftover");
                FileReport::new(path, Some(dest), Outcome::Swept)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "sweep could not move file");
                FileReport::new(
                    path,
                    None,
                    Outcome::Failed {
                        error: e.to_string(),
                        left_at: Some(path.to_path_buf()),
                    },
                )
            }
        });
    }
    reports
}
