//! Key-file loading.
//!
//! A key file is a flat byte blob with no internal structure; every byte
//! participates in the repeating XOR mask. Emptiness is rejected here so
//! the diagnostic names the file, rather than surfacing later as a bare
//! codec error.

use std::fs;
use std::io;
use std::path::Path;

/// Read a key file in full.
///
/// # Errors
/// Any I/O error from reading the file, plus `InvalidData` for an empty
/// file (an empty key cannot repeat).
pub fn load_key(path: &Path) -> io::Result<Vec<u8>> {
    let key = fs::read(path)?;
    if key.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("key file {} is empty", path.display()),
        ));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_key() {
        let dir = std::env::temp_dir();
        let path = dir.join("puff_test_key.bin");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        drop(file);

        assert_eq!(load_key(&path).unwrap(), vec![1, 2, 3]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_key_file() {
        let path = Path::new("/nonexistent/puff-key");
        assert!(load_key(path).is_err());
    }

    #[test]
    fn test_empty_key_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("puff_test_key_empty.bin");
        fs::File::create(&path).unwrap();

        assert!(load_key(&path).is_err());
        fs::remove_file(&path).ok();
    }
}
