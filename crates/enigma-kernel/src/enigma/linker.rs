//! Namespace linker.
//!
//! Binds names to nodes inside directories. Every entry goes through the same
//! two phases: reserve a slot under the parent, then publish it once its node
//! exists. The reservation is an [`EntrySlot`] guard, so any early return
//! between the phases gives the slot back and a half-built entry is never
//! visible under the parent.

use std::ops::{Deref, DerefMut};

use enigma_types::FileMode;

use super::arena::{Arena, CounterId, EntryId, NodeId};
use super::node::{NodeOps, make_node};
use crate::constants::{COUNTER_FILE_PERM, DIR_PERM};
use crate::vfs::VfsResult;

/// A reserved, unpublished directory entry slot.
///
/// Derefs to the arena so the node can be built while the slot is held.
/// Dropping the guard without [`EntrySlot::publish`] releases the slot.
pub struct EntrySlot<'a> {
    arena: &'a mut Arena,
    parent: Option<EntryId>,
    name: String,
    published: bool,
}

impl<'a> EntrySlot<'a> {
    /// Reserve a slot for `name` under `parent`.
    pub fn alloc(arena: &'a mut Arena, parent: Option<EntryId>, name: &str) -> VfsResult<Self> {
        arena.reserve_entry(parent, name)?;
        Ok(Self {
            arena,
            parent,
            name: name.to_string(),
            published: false,
        })
    }

    /// Bind the slot to `node` and make it visible under the parent.
    pub fn publish(mut self, node: NodeId) -> EntryId {
        self.published = true;
        let name = std::mem::take(&mut self.name);
        let entry = self.arena.publish_entry(self.parent, name, node);
        tracing::debug!(
            name = %self.arena.entry(entry).name(),
            ino = %node.ino(),
            "linked entry"
        );
        entry
    }
}

impl Deref for EntrySlot<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        &*self.arena
    }
}

impl DerefMut for EntrySlot<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        &mut *self.arena
    }
}

impl Drop for EntrySlot<'_> {
    fn drop(&mut self) {
        if !self.published {
            self.arena.release_entry();
            tracing::debug!(name = %self.name, "released unpublished entry slot");
        }
    }
}

/// Bind an existing node under `parent` (`None` makes it the root entry).
pub fn link_entry(
    arena: &mut Arena,
    parent: Option<EntryId>,
    name: &str,
    node: NodeId,
) -> VfsResult<EntryId> {
    let slot = EntrySlot::alloc(arena, parent, name)?;
    Ok(slot.publish(node))
}

/// Create a counter file `name` under `parent`, backed by `counter`.
pub fn create_file_entry(
    arena: &mut Arena,
    parent: EntryId,
    name: &str,
    counter: CounterId,
) -> VfsResult<EntryId> {
    let mut slot = EntrySlot::alloc(arena, Some(parent), name)?;
    let node = make_node(
        &mut slot,
        FileMode::regular(COUNTER_FILE_PERM),
        NodeOps::CounterFile(counter),
    )?;
    Ok(slot.publish(node))
}

/// Create an empty directory `name` under `parent`.
pub fn create_dir_entry(arena: &mut Arena, parent: EntryId, name: &str) -> VfsResult<EntryId> {
    let mut slot = EntrySlot::alloc(arena, Some(parent), name)?;
    let node = make_node(&mut slot, FileMode::directory(DIR_PERM), NodeOps::SimpleDir)?;
    slot.node_mut(node).set_nlink(2);
    Ok(slot.publish(node))
}
