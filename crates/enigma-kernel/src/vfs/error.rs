//! VFS error types.

use std::io;
use thiserror::Error;

/// VFS error type.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Node or entry allocation failed.
    #[error("out of memory")]
    OutOfMemory,

    /// Argument rejected by the operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Bytes could not be transferred to or from the caller's buffer.
    #[error("bad address")]
    Fault,

    /// File or directory not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Name already bound in the parent directory.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Resource in use (mount point occupied, type registered, module busy).
    #[error("resource busy: {0}")]
    Busy(String),

    /// No filesystem type registered under this name.
    #[error("unknown filesystem type: {0}")]
    NoSuchFileSystem(String),

    /// No mount point for path.
    #[error("no mount point for path: {0}")]
    NoMountPoint(String),

    /// Invalid path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl VfsError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists(name.into())
    }

    /// Create a Busy error.
    pub fn busy(what: impl Into<String>) -> Self {
        Self::Busy(what.into())
    }

    /// Create a NoMountPoint error.
    pub fn no_mount_point(path: impl Into<String>) -> Self {
        Self::NoMountPoint(path.into())
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// The POSIX error number a system call would report for this error.
    pub fn errno(&self) -> i32 {
        match self {
            VfsError::OutOfMemory => 12,          // ENOMEM
            VfsError::InvalidArgument(_) => 22,   // EINVAL
            VfsError::Fault => 14,                // EFAULT
            VfsError::NotFound(_) => 2,           // ENOENT
            VfsError::NotADirectory(_) => 20,     // ENOTDIR
            VfsError::IsADirectory(_) => 21,      // EISDIR
            VfsError::AlreadyExists(_) => 17,     // EEXIST
            VfsError::Busy(_) => 16,              // EBUSY
            VfsError::NoSuchFileSystem(_) => 19,  // ENODEV
            VfsError::NoMountPoint(_) => 2,       // ENOENT
            VfsError::InvalidPath(_) => 22,       // EINVAL
            VfsError::Other(_) => 5,              // EIO
        }
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::OutOfMemory => io::Error::new(io::ErrorKind::OutOfMemory, "out of memory"),
            VfsError::InvalidArgument(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            VfsError::Fault => io::Error::other("bad address"),
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            VfsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            VfsError::AlreadyExists(msg) => io::Error::new(io::ErrorKind::AlreadyExists, msg),
            VfsError::Busy(msg) => io::Error::new(io::ErrorKind::ResourceBusy, msg),
            VfsError::NoSuchFileSystem(msg) => io::Error::new(io::ErrorKind::Unsupported, msg),
            VfsError::NoMountPoint(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::InvalidPath(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            VfsError::Other(msg) => io::Error::other(msg),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;
