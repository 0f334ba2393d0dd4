//! Node factory.
//!
//! A node is the driver's inode: mode bits, timestamps, a node number and
//! the capability set the host dispatches through. Nodes are only ever made
//! while an instance is being built.

use std::time::SystemTime;

use enigma_types::{FileAttr, FileMode, FileType, Ino};

use super::arena::{Arena, CounterId, EntryId, NodeId};
use crate::vfs::{VfsError, VfsResult};

/// Capability set of a node.
///
/// Selects which operations the host may dispatch to the node; a counter
/// file carries the counter cell its reads and writes act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOps {
    /// Generic directory: lookup and listing, no data.
    SimpleDir,
    /// Counter file protocol over the given cell.
    CounterFile(CounterId),
}

impl NodeOps {
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeOps::SimpleDir)
    }

    /// Mode type bits a node with these capabilities must carry.
    fn required_type(&self) -> FileMode {
        match self {
            NodeOps::SimpleDir => FileMode::S_IFDIR,
            NodeOps::CounterFile(_) => FileMode::S_IFREG,
        }
    }

    fn file_type(&self) -> FileType {
        match self {
            NodeOps::SimpleDir => FileType::Directory,
            NodeOps::CounterFile(_) => FileType::File,
        }
    }
}

/// In-memory node.
#[derive(Debug)]
pub struct Node {
    ino: Ino,
    mode: FileMode,
    ops: NodeOps,
    nlink: u32,
    atime: SystemTime,
    mtime: SystemTime,
    ctime: SystemTime,
    dentry: Option<EntryId>,
}

impl Node {
    /// A fresh node with all three timestamps set to now and one link.
    pub fn new(ino: Ino, mode: FileMode, ops: NodeOps) -> Self {
        let now = SystemTime::now();
        Self {
            ino,
            mode,
            ops,
            nlink: 1,
            atime: now,
            mtime: now,
            ctime: now,
            dentry: None,
        }
    }

    pub fn ino(&self) -> Ino {
        self.ino
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn ops(&self) -> NodeOps {
        self.ops
    }

    pub fn nlink(&self) -> u32 {
        self.nlink
    }

    pub fn set_nlink(&mut self, nlink: u32) {
        self.nlink = nlink;
    }

    /// The entry this node is published under, once it is.
    pub fn dentry(&self) -> Option<EntryId> {
        self.dentry
    }

    pub(super) fn set_dentry(&mut self, entry: EntryId) {
        self.dentry = Some(entry);
    }

    /// Attributes as reported to the host.
    pub fn attr(&self, blksize: u32) -> FileAttr {
        FileAttr {
            ino: self.ino,
            size: 0,
            kind: self.ops.file_type(),
            mode: self.mode.bits(),
            nlink: self.nlink,
            atime: self.atime,
            mtime: self.mtime,
            ctime: self.ctime,
            blksize,
        }
    }
}

/// Allocate a node in `arena` with `mode` and capability set `ops`.
///
/// The mode's type bits must agree with `ops` (directory bits for
/// [`NodeOps::SimpleDir`], regular-file bits for [`NodeOps::CounterFile`]).
/// On failure nothing is added to the arena.
pub fn make_node(arena: &mut Arena, mode: FileMode, ops: NodeOps) -> VfsResult<NodeId> {
    if mode.file_type_bits() != ops.required_type() {
        return Err(VfsError::invalid_argument(format!(
            "mode {:o} does not match {:?}",
            mode.bits(),
            ops
        )));
    }
    let id = arena.alloc_node(|ino| Node::new(ino, mode, ops))?;
    tracing::debug!(ino = %id.ino(), mode = %format!("{:o}", mode.bits()), ?ops, "made node");
    Ok(id)
}
