//! Host/driver contract traits.
//!
//! A driver plugs into the host through three seams:
//!
//! - [`FileSystemType`] - registered once by name; the host calls `mount`
//!   and `kill_sb` on user mount/unmount requests.
//! - [`SuperOps`] - one mounted instance: name resolution, attributes,
//!   generic directory listing and `open`.
//! - [`FileOps`] - the per-descriptor handle returned by `open`; the host
//!   owns the position and passes it to every `read`/`write`.

use async_trait::async_trait;
use std::sync::Arc;

use enigma_types::{DirEntry, FileAttr, Ino, StatFs};

use super::VfsResult;

/// A filesystem type the host can mount.
#[async_trait]
pub trait FileSystemType: Send + Sync {
    /// Unique name the type is registered under.
    fn name(&self) -> &str;

    /// Build a new instance.
    ///
    /// `dev_name` is whatever the user passed as the device; drivers
    /// without a backing device ignore it.
    async fn mount(&self, dev_name: Option<&str>) -> VfsResult<Arc<dyn SuperOps>>;

    /// Tear an instance down.
    ///
    /// The host may call this more than once for the same instance; only
    /// the first call has an effect.
    fn kill_sb(&self, sb: &dyn SuperOps);
}

/// One mounted filesystem instance.
pub trait SuperOps: Send + Sync {
    /// Node number of the root directory.
    fn root(&self) -> Ino;

    /// Resolve `name` inside directory `dir`.
    fn lookup(&self, dir: Ino, name: &str) -> VfsResult<Ino>;

    /// Attributes of a node.
    fn getattr(&self, ino: Ino) -> VfsResult<FileAttr>;

    /// Entries of a directory, sorted by name, without `.` and `..`.
    fn readdir(&self, dir: Ino) -> VfsResult<Vec<DirEntry>>;

    /// Filesystem statistics.
    fn statfs(&self) -> StatFs;

    /// Open a node, binding a fresh descriptor handle to it.
    fn open(self: Arc<Self>, ino: Ino) -> VfsResult<Box<dyn FileOps>>;

    /// Mark the instance dead. Returns true only for the call that did it.
    fn deactivate(&self) -> bool;
}

/// Per-descriptor file operations.
///
/// Both calls take the transfer length separately from the buffer: a
/// buffer shorter than the bytes actually transferred is a fault, not a
/// short transfer.
#[async_trait]
pub trait FileOps: Send + Sync {
    /// Read up to `count` bytes at `*pos` into `buf`, advancing `*pos`.
    ///
    /// Returns the number of bytes delivered; 0 means end of file.
    async fn read(&self, buf: &mut [u8], count: usize, pos: &mut u64) -> VfsResult<usize>;

    /// Write `count` bytes from `buf` at `*pos`.
    ///
    /// Returns the number of bytes accepted.
    async fn write(&self, buf: &[u8], count: usize, pos: &mut u64) -> VfsResult<usize>;
}
