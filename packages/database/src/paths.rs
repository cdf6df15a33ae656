//! Default locations of local data.
//!
//! Everything lives under `<workspace>/data/`: the key-value store in
//! `data/cache/` and one CSV per year in `data/years/`.

use std::path::{Path, PathBuf};

/// The workspace root, two levels above this crate's manifest.
///
/// Falls back to the manifest directory when it has no such ancestor.
#[must_use]
pub fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .map_or_else(|| manifest_dir.to_path_buf(), Path::to_path_buf)
}

#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Directory of the default [`crate::file_store::FileStore`].
#[must_use]
pub fn cache_dir() -> PathBuf {
    data_dir().join("cache")
}

/// Directory holding one CSV per year.
#[must_use]
pub fn years_dir() -> PathBuf {
    data_dir().join("years")
}

/// Creates `dir` and its parents unless it already exists.
///
/// # Errors
///
/// Returns the I/O error if `dir` cannot be created.
pub fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dirs_live_under_project_root() {
        let root = project_root();
        assert!(cache_dir().starts_with(&root));
        assert!(years_dir().starts_with(root.join("data")));
    }

    #[test]
    fn ensure_dir_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
