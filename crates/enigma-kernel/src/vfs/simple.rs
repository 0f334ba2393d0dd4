//! Generic directory file operations.
//!
//! Directories carry no data of their own; listing goes through
//! [`SuperOps::readdir`](super::SuperOps::readdir). A descriptor opened on a
//! directory exists only so it can be listed or stat'ed.

use async_trait::async_trait;

use super::{FileOps, VfsError, VfsResult};

/// Descriptor handle for an open directory.
#[derive(Debug, Default)]
pub struct SimpleDirFile {
    name: String,
}

impl SimpleDirFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl FileOps for SimpleDirFile {
    async fn read(&self, _buf: &mut [u8], _count: usize, _pos: &mut u64) -> VfsResult<usize> {
        Err(VfsError::is_a_directory(self.name.clone()))
    }

    async fn write(&self, _buf: &[u8], _count: usize, _pos: &mut u64) -> VfsResult<usize> {
        Err(VfsError::is_a_directory(self.name.clone()))
    }
}
