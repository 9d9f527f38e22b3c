//! Content digests.

use std::fs::File;
use std::io::{self, BufReader};

use camino::Utf8Path;
use sha2::{Digest, Sha256};

use crate::error::FsError;

/// Computes the SHA-256 digest of a file as lowercase hex.
///
/// The file is streamed, so memory use does not depend on its size.
pub fn sha256_file(path: impl AsRef<Utf8Path>) -> Result<String, FsError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| FsError::io(path, e))?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(|e| FsError::io(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_file_digest_is_streamed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("a.csv")).unwrap();
        let content = "Артикул,Бренд\n6205,SKF\n".repeat(10_000);
        std::fs::write(&path, &content).unwrap();

        let digest = sha256_file(&path).unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, format!("{:x}", Sha256::digest(content.as_bytes())));
    }

    #[test]
    fn test_missing_file() {
        let err = sha256_file("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, FsError::Io { .. }));
    }
}
