//! Node identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A node number, unique within one mounted filesystem instance.
///
/// Numbers start at 1 (the root) and are never reused while the instance
/// is alive. Two instances may hand out the same numbers.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ino(u64);

impl Ino {
    /// The first number handed out by an instance.
    pub const FIRST: Ino = Ino(1);

    /// Wrap a raw node number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw node number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Ino {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ino({})", self.0)
    }
}

impl fmt::Display for Ino {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
