//! Instance-owned storage for nodes, directory entries and counters.
//!
//! Everything reachable from an instance's root lives in one [`Arena`] and is
//! addressed by index. Nothing is ever freed individually: dropping the arena
//! releases the whole tree at once.

use enigma_types::Ino;

use super::counter::AtomicCounter;
use super::node::Node;
use crate::config::Limits;
use crate::vfs::{VfsError, VfsResult};

/// Index of a node in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Index of a directory entry in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// Index of a counter cell in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterId(usize);

impl NodeId {
    /// The node number the host sees. Node numbers follow allocation order,
    /// starting at 1.
    pub fn ino(self) -> Ino {
        Ino::new(self.0 as u64 + 1)
    }

    /// Inverse of [`NodeId::ino`].
    pub fn from_ino(ino: Ino) -> Option<Self> {
        let raw = ino.get().checked_sub(1)?;
        usize::try_from(raw).ok().map(NodeId)
    }
}

/// A name bound to a node inside a parent directory.
#[derive(Debug)]
pub struct Dentry {
    name: String,
    parent: Option<EntryId>,
    node: NodeId,
    children: Vec<EntryId>,
}

impl Dentry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning directory entry; `None` only for the root.
    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Published child entries, in publication order.
    pub fn children(&self) -> &[EntryId] {
        &self.children
    }
}

/// Storage for one filesystem instance.
#[derive(Debug, Default)]
pub struct Arena {
    limits: Limits,
    nodes: Vec<Node>,
    entries: Vec<Dentry>,
    /// Entry slots handed out but not yet published or released.
    reserved_entries: usize,
    counters: Vec<AtomicCounter>,
}

impl Arena {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Store a node built by `build` from the node number it will get.
    ///
    /// Fails with [`VfsError::OutOfMemory`] when the node budget is spent or
    /// the allocator refuses; `build` is not called in that case.
    pub fn alloc_node(&mut self, build: impl FnOnce(Ino) -> Node) -> VfsResult<NodeId> {
        if self
            .limits
            .max_nodes
            .is_some_and(|max| self.nodes.len() >= max)
        {
            return Err(VfsError::OutOfMemory);
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| VfsError::OutOfMemory)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(build(id.ino()));
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Resolve a host node number.
    pub fn node_by_ino(&self, ino: Ino) -> VfsResult<(NodeId, &Node)> {
        NodeId::from_ino(ino)
            .and_then(|id| self.nodes.get(id.0).map(|node| (id, node)))
            .ok_or_else(|| VfsError::not_found(format!("ino {ino}")))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Directory entries
    // ========================================================================

    /// Reserve a slot for `name` under `parent` (`None` for the root entry,
    /// whose name is not checked).
    ///
    /// Every successful reservation must be followed by exactly one
    /// [`Arena::publish_entry`] or [`Arena::release_entry`].
    pub fn reserve_entry(&mut self, parent: Option<EntryId>, name: &str) -> VfsResult<()> {
        if let Some(parent) = parent {
            if name.is_empty() || name.contains('/') || name == "." || name == ".." {
                return Err(VfsError::invalid_argument(format!("bad entry name {name:?}")));
            }
            let dir = &self.entries[parent.0];
            if !self.node(dir.node).ops().is_dir() {
                return Err(VfsError::not_a_directory(dir.name.clone()));
            }
            if dir.children.iter().any(|c| self.entries[c.0].name == name) {
                return Err(VfsError::already_exists(name));
            }
        }

        let in_use = self.entries.len() + self.reserved_entries;
        if self.limits.max_entries.is_some_and(|max| in_use >= max) {
            return Err(VfsError::OutOfMemory);
        }
        self.entries
            .try_reserve(self.reserved_entries + 1)
            .map_err(|_| VfsError::OutOfMemory)?;

        self.reserved_entries += 1;
        Ok(())
    }

    /// Give back an unpublished reservation.
    pub fn release_entry(&mut self) {
        debug_assert!(self.reserved_entries > 0, "release without reservation");
        self.reserved_entries = self.reserved_entries.saturating_sub(1);
    }

    /// Turn a reservation into a visible entry bound to `node`.
    pub fn publish_entry(&mut self, parent: Option<EntryId>, name: String, node: NodeId) -> EntryId {
        debug_assert!(self.reserved_entries > 0, "publish without reservation");
        self.reserved_entries = self.reserved_entries.saturating_sub(1);

        let id = EntryId(self.entries.len());
        self.entries.push(Dentry {
            name,
            parent,
            node,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.entries[parent.0].children.push(id);
        }
        self.nodes[node.0].set_dentry(id);
        id
    }

    pub fn entry(&self, id: EntryId) -> &Dentry {
        &self.entries[id.0]
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn reserved_entries(&self) -> usize {
        self.reserved_entries
    }

    // ========================================================================
    // Counters
    // ========================================================================

    /// Add a counter cell, starting at 0.
    pub fn add_counter(&mut self) -> CounterId {
        let id = CounterId(self.counters.len());
        self.counters.push(AtomicCounter::new());
        id
    }

    pub fn counter(&self, id: CounterId) -> &AtomicCounter {
        &self.counters[id.0]
    }
}
