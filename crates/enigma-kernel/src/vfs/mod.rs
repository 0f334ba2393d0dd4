//! Host filesystem framework boundary.
//!
//! This module is the part of the host a driver talks to, kept as small as
//! the driver needs. Key components:
//!
//! - [`FileSystemType`], [`SuperOps`], [`FileOps`] - the contract a driver
//!   implements
//! - [`FileSystemRegistry`] - filesystem types by name
//! - [`MountTable`] - mounts instances at paths and routes requests to them
//! - [`File`] - an open descriptor; owns the position
//!
//! ## Design Decisions
//!
//! - **Node numbers, not paths, cross the boundary**: the host walks paths
//!   with `lookup` and then talks to the driver in node numbers.
//! - **Positions live in the host**: drivers see `&mut u64` per call and keep
//!   no per-descriptor cursor of their own.
//! - **Longest-prefix routing**: MountTable routes to the most specific
//!   mount point that matches.

mod error;
mod file;
mod mount;
mod ops;
mod registry;
mod simple;
mod uaccess;

pub use error::{VfsError, VfsResult};
pub use file::File;
pub use mount::{MountInfo, MountTable};
pub use ops::{FileOps, FileSystemType, SuperOps};
pub use registry::FileSystemRegistry;
pub use simple::SimpleDirFile;
pub use uaccess::{copy_from_user, copy_to_user};
