//! # enigma-types
//!
//! Value types shared between the enigmafs driver and the host that mounts
//! it. Everything here is plain data: node identifiers, mode bits, the
//! attributes reported by `getattr`, directory listing entries and `statfs`
//! results.

mod attr;
mod ids;
mod mode;

pub use attr::{DirEntry, FileAttr, FileType, StatFs};
pub use ids::Ino;
pub use mode::FileMode;
