//! Filename normalization and collision-free destination names.
//!
//! ## Facetune exports
//!
//! Facetune writes exports as `Facetune_<DD>-<MM>-<YYYY>-<HH>-<MM>-<SS>.jpg`.
//! The calendar date is noise once the photo is filed, so [`normalize`] drops it:
//!
//! - `Facetune_01-02-2023-10-11-12.jpg` → `Facetune_10-11-12.jpg`
//! - `Facetune_01-02-2023-10-11-12.png` → unchanged (only lowercase `.jpg` matches)
//! - `Facetune_1-02-2023-10-11-12.jpg` → unchanged (fixed two-digit widths)
//! - `holiday.jpg` → unchanged
//!
//! The output never matches the pattern again, so normalizing twice is the same
//! as normalizing once.
//!
//! ## Collisions
//!
//! Nothing is ever overwritten. [`unique_path`] appends `-1`, `-2`, … to the
//! stem until the name is free: `photo.jpg` → `photo-1.jpg`.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static FACETUNE_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Facetune_)\d{2}-\d{2}-\d{4}-(\d{2}-\d{2}-\d{2})(\.jpg)$")
        .expect("facetune pattern must compile")
});

/// Map a raw filename to its canonical form.
///
/// Total and pure: names that do not match the Facetune export convention are
/// returned as-is.
pub fn normalize(name: &str) -> String {
    FACETUNE_EXPORT.replace(name, "$1$2$3").into_owned()
}

/// First path in `dir` named `name`, or `name` with a `-N` stem suffix, that
/// does not exist yet.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1u32..)
        .map(|n| dir.join(format!("{stem}-{n}{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
