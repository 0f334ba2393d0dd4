//! # enigma-kernel
//!
//! A synthetic counter filesystem driver and the host boundary it mounts
//! into.
//!
//! Every mount builds the same tree from nothing:
//!
//! ```text
//! /counter              counter file
//! /subdir/              directory
//! /subdir/subcounter    counter file
//! ```
//!
//! Reading a counter file from the start reports its counter and bumps it by
//! one; writing a decimal number replaces it. Counters live with the mounted
//! instance and start over at 0 on every mount.

pub mod config;
pub mod constants;
pub mod enigma;
pub mod vfs;

pub use config::{ConfigError, EnigmaConfig, Limits};
pub use enigma::{EnigmaFs, EnigmaModule, EnigmaSuper};
pub use enigma_types::{DirEntry, FileAttr, FileMode, FileType, Ino, StatFs};
pub use vfs::{
    File, FileOps, FileSystemRegistry, FileSystemType, MountInfo, MountTable, SuperOps,
    VfsError, VfsResult,
};
