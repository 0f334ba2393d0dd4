//! Driver constants.
//!
//! Centralizes the fixed values of the on-mount layout and the counter file
//! text format.

/// Filesystem type name registered with the host.
pub const FS_NAME: &str = "enigma";

/// Superblock magic number.
pub const ENIGMA_MAGIC: u32 = 0x1992_0342;

/// Default block size reported to the host (no backing device).
pub const DEFAULT_BLOCK_SIZE: u32 = 4096;

/// log2 of [`DEFAULT_BLOCK_SIZE`].
pub const DEFAULT_BLOCK_SIZE_BITS: u8 = 12;

/// Maximum name length reported by `statfs`.
pub const NAME_MAX: u32 = 255;

/// Capacity of the counter text buffer, terminator included.
///
/// A write of this many bytes or more is rejected.
pub const COUNTER_BUF_SIZE: usize = 20;

/// Permission bits of counter files.
pub const COUNTER_FILE_PERM: u32 = 0o644;

/// Permission bits of directories.
pub const DIR_PERM: u32 = 0o755;

/// Counter file directly under the root.
pub const ROOT_COUNTER_NAME: &str = "counter";

/// Subdirectory under the root.
pub const SUBDIR_NAME: &str = "subdir";

/// Counter file inside [`SUBDIR_NAME`].
pub const SUB_COUNTER_NAME: &str = "subcounter";
