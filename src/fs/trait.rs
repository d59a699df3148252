use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Source of mount and secure-socket file contents
///
/// The configuration resolver reads each referenced file exactly once and never
/// writes, so a single byte-level read is all it needs.
pub trait FileSystem: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        (**self).read(path)
    }
}
