//! The enigma driver.
//!
//! - [`node`] - node factory
//! - [`linker`] - binds names to nodes, two-phase
//! - [`counter`] - counter file read/write protocol
//! - [`mount`] - instance construction, the filesystem type, module lifetime
//!
//! All per-instance state, counters included, lives in the instance's
//! [`Arena`]; nodes and entries refer to each other by index into it.

pub mod arena;
pub mod counter;
pub mod linker;
pub mod mount;
pub mod node;

pub use arena::{Arena, CounterId, Dentry, EntryId, NodeId};
pub use counter::{AtomicCounter, CounterFile};
pub use linker::{EntrySlot, create_dir_entry, create_file_entry, link_entry};
pub use mount::{EnigmaFs, EnigmaModule, EnigmaSuper};
pub use node::{Node, NodeOps, make_node};
