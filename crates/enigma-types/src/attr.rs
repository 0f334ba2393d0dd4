//! Node attributes, directory entries and filesystem statistics.
//!
//! These are what the host sees of a node: the driver keeps its own richer
//! representation and renders one of these on `getattr`, `readdir` and
//! `statfs`.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::ids::Ino;

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// File attributes (metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttr {
    /// Node number.
    pub ino: Ino,
    /// Size in bytes. Synthetic files report 0.
    pub size: u64,
    /// File type.
    pub kind: FileType,
    /// Full `st_mode` (type and permission bits).
    pub mode: u32,
    /// Number of hard links.
    pub nlink: u32,
    /// Last access time.
    pub atime: SystemTime,
    /// Last modification time.
    pub mtime: SystemTime,
    /// Last status change time.
    pub ctime: SystemTime,
    /// Preferred I/O block size.
    pub blksize: u32,
}

impl FileAttr {
    /// Permission bits only (e.g. `0o644`).
    pub fn perm(&self) -> u32 {
        self.mode & 0o777
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Node the name is bound to.
    pub ino: Ino,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, ino: Ino, kind: FileType) -> Self {
        Self {
            name: name.into(),
            ino,
            kind,
        }
    }
}

/// Filesystem statistics.
///
/// A filesystem without a backing device reports zero blocks; only the
/// identification fields and the node count carry information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatFs {
    /// Filesystem magic number.
    pub magic: u32,
    /// Block size.
    pub bsize: u32,
    /// Total blocks.
    pub blocks: u64,
    /// Free blocks.
    pub bfree: u64,
    /// Available blocks (to non-root).
    pub bavail: u64,
    /// Nodes in use.
    pub files: u64,
    /// Free nodes.
    pub ffree: u64,
    /// Maximum name length.
    pub namelen: u32,
    /// log2 of `bsize`.
    pub bsize_bits: u8,
}
