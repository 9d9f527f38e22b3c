//! Filesystem helpers: atomic replacement and file relocation.

use std::io::Write;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;

use crate::error::FsError;

/// Replaces `path` with `bytes` atomically.
///
/// The data is written to a temporary file in the same directory, synced,
/// and renamed over the target. Readers see either the old or the new
/// content, never a partial file. If anything fails before the rename the
/// previous file is untouched and the temporary file is removed.
pub fn atomic_write(path: impl AsRef<Utf8Path>, bytes: &[u8]) -> Result<(), FsError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    ensure_dir(dir)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FsError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| FsError::io(path, e))?;
    tmp.flush().map_err(|e| FsError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| FsError::io(path, e))?;
    tmp.persist(path).map_err(|source| FsError::Persist {
        path: path.to_owned(),
        source,
    })?;
    Ok(())
}

/// Creates a directory and its parents if missing.
pub fn ensure_dir(dir: impl AsRef<Utf8Path>) -> Result<(), FsError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| FsError::io(dir, e))
}

/// Moves a file, falling back to copy-and-remove across filesystems.
pub fn move_file(from: impl AsRef<Utf8Path>, to: impl AsRef<Utf8Path>) -> Result<(), FsError> {
    let (from, to) = (from.as_ref(), to.as_ref());
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(from = %from, to = %to, error = %rename_err, "rename failed, copying");
            std::fs::copy(from, to).map_err(|e| FsError::io(from, e))?;
            std::fs::remove_file(from).map_err(|e| FsError::io(from, e))
        }
    }
}

/// Returns a path in `dir` for `file_name` that does not exist yet.
///
/// Collisions get `_dup`, `_dup2`, `_dup3`, ... appended to the stem.
///
/// # Examples
///
/// ```
/// use brg_core::unique_destination;
///
/// let tmp = tempfile::tempdir().unwrap();
/// let dir = camino::Utf8Path::from_path(tmp.path()).unwrap();
/// assert_eq!(unique_destination(dir, "a.csv"), dir.join("a.csv"));
///
/// std::fs::write(dir.join("a.csv"), "x").unwrap();
/// assert_eq!(unique_destination(dir, "a.csv"), dir.join("a_dup.csv"));
/// ```
#[must_use]
pub fn unique_destination(dir: &Utf8Path, file_name: &str) -> Utf8PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Utf8Path::new(file_name);
    let stem = name.file_stem().unwrap_or(file_name);
    let ext = name.extension().map(|e| format!(".{e}")).unwrap_or_default();

    let mut n: u32 = 1;
    loop {
        let suffix = if n == 1 {
            "_dup".to_owned()
        } else {
            format!("_dup{n}")
        };
        let candidate = dir.join(format!("{stem}{suffix}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Converts a std path into a UTF-8 path.
pub fn utf8_path(path: PathBuf) -> Result<Utf8PathBuf, FsError> {
    Utf8PathBuf::from_path_buf(path).map_err(FsError::NonUtf8Path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = utf8_path(tmp.path().to_path_buf()).unwrap();
        (tmp, dir)
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let (_tmp, dir) = tmp_dir();
        let target = dir.join("out/catalog.json");

        atomic_write(&target, b"[1]").unwrap();
        atomic_write(&target, b"[1,2]").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "[1,2]");
        let leftovers: Vec<_> = std::fs::read_dir(dir.join("out")).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_interrupted_write_keeps_previous_version() {
        let (_tmp, dir) = tmp_dir();
        let target = dir.join("registry.json");
        atomic_write(&target, br#"{"a":1}"#).unwrap();

        // Write the temp file but drop it before persisting.
        {
            let mut tmp = NamedTempFile::new_in(&dir).unwrap();
            tmp.write_all(b"{\"a\":").unwrap();
        }

        assert_eq!(std::fs::read_to_string(&target).unwrap(), r#"{"a":1}"#);
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
    }

    #[test]
    fn test_move_file() {
        let (_tmp, dir) = tmp_dir();
        let from = dir.join("a.csv");
        let to = dir.join("processed/a.csv");
        std::fs::write(&from, "x").unwrap();
        ensure_dir(dir.join("processed")).unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "x");
    }

    #[test]
    fn test_move_missing_file_fails() {
        let (_tmp, dir) = tmp_dir();
        let err = move_file(dir.join("nope.csv"), dir.join("b.csv")).unwrap_err();
        assert_eq!(err.path(), Some(&dir.join("nope.csv")));
    }

    #[test]
    fn test_unique_destination_counts_up() {
        let (_tmp, dir) = tmp_dir();
        for name in ["a.csv", "a_dup.csv", "a_dup2.csv"] {
            std::fs::write(dir.join(name), "").unwrap();
        }
        assert_eq!(unique_destination(&dir, "a.csv"), dir.join("a_dup3.csv"));

        std::fs::write(dir.join("README"), "").unwrap();
        assert_eq!(unique_destination(&dir, "README"), dir.join("README_dup"));
    }
}
