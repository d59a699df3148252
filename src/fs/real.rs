use super::FileSystem;
use anyhow::{Context, Result};
use std::path::Path;

/// Reads straight from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_binary_content() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("keystore.p12");
        std::fs::write(&store, [0x30, 0x82, 0xff, 0x00]).unwrap();

        assert_eq!(RealFileSystem.read(&store).unwrap(), vec![0x30, 0x82, 0xff, 0x00]);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("db.pass");

        let err = RealFileSystem.read(&missing).unwrap_err();
        assert!(format!("{:#}", err).contains("db.pass"));
    }
}
