//! Open file descriptors.

use std::path::{Path, PathBuf};

use super::error::VfsResult;
use super::ops::FileOps;

/// Chunk size used by [`File::read_to_end`].
const READ_CHUNK: usize = 64;

/// An open descriptor: the driver's handle plus the host-owned position.
///
/// Each `open` yields an independent descriptor; two descriptors on the same
/// path share whatever state the driver keeps behind the node, but never
/// their positions.
pub struct File {
    path: PathBuf,
    ops: Box<dyn FileOps>,
    pos: u64,
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("pos", &self.pos)
            .finish()
    }
}

impl File {
    pub(crate) fn new(path: PathBuf, ops: Box<dyn FileOps>) -> Self {
        Self { path, ops, pos: 0 }
    }

    /// Path this descriptor was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current position.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Set the position (absolute seek).
    pub fn seek(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// Read up to `count` bytes into `buf` at the current position.
    pub async fn read(&mut self, buf: &mut [u8], count: usize) -> VfsResult<usize> {
        let n = self.ops.read(buf, count, &mut self.pos).await?;
        tracing::trace!(path = %self.path.display(), n, pos = self.pos, "read");
        Ok(n)
    }

    /// Write `count` bytes from `buf` at the current position.
    pub async fn write(&mut self, buf: &[u8], count: usize) -> VfsResult<usize> {
        let n = self.ops.write(buf, count, &mut self.pos).await?;
        tracing::trace!(path = %self.path.display(), n, pos = self.pos, "write");
        Ok(n)
    }

    /// Read until the driver reports end of file.
    pub async fn read_to_end(&mut self) -> VfsResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = self.read(&mut chunk, READ_CHUNK).await?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }
}
