//! Counter file protocol.
//!
//! A counter file's body is the decimal value of its counter cell followed
//! by a newline. Reading a descriptor from position 0 renders the cell and
//! increments it. Reads at a later position render the cell's current value
//! minus one, compensating for that increment: a descriptor drained in
//! several pieces reports one value as long as nothing else touches the cell
//! in between. Writing replaces the value.
//!
//! The cell is shared by every descriptor on the file; descriptors share
//! nothing else.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use super::arena::CounterId;
use super::mount::EnigmaSuper;
use crate::constants::COUNTER_BUF_SIZE;
use crate::vfs::{FileOps, VfsError, VfsResult, copy_from_user, copy_to_user};

/// A 32-bit counter cell. Arithmetic wraps.
#[derive(Debug, Default)]
pub struct AtomicCounter(AtomicI32);

impl AtomicCounter {
    pub fn new() -> Self {
        Self(AtomicI32::new(0))
    }

    pub fn get(&self) -> i32 {
        self.0.load(Ordering::SeqCst)
    }

    /// Add one, returning the value before the increment.
    pub fn increment(&self) -> i32 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    pub fn set(&self, value: i32) {
        self.0.store(value, Ordering::SeqCst);
    }
}

/// Render `value` as `"<decimal>\n"`.
///
/// Returns the buffer and the rendered length.
pub fn render(value: i32) -> ([u8; COUNTER_BUF_SIZE], usize) {
    let text = format!("{value}\n");
    let mut buf = [0u8; COUNTER_BUF_SIZE];
    // Truncate the way snprintf into the same buffer would.
    let len = text.len().min(COUNTER_BUF_SIZE - 1);
    buf[..len].copy_from_slice(&text.as_bytes()[..len]);
    (buf, len)
}

/// Parse a base-10 integer prefix.
///
/// An optional leading `-` is followed by decimal digits; parsing stops at
/// the first other byte. No digits at all yields 0. Overflow wraps to 32 bits.
pub fn parse(buf: &[u8]) -> i32 {
    let (negative, digits) = match buf.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, buf),
    };
    let magnitude = digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u64, |acc, b| {
            acc.wrapping_mul(10).wrapping_add(u64::from(b - b'0'))
        });
    let value = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    value as i32
}

/// Descriptor handle of an open counter file.
pub struct CounterFile {
    sb: Arc<EnigmaSuper>,
    counter: CounterId,
}

impl CounterFile {
    /// Bind a descriptor to `counter`. Never fails: there is no per-open
    /// state beyond the binding.
    pub fn open(sb: Arc<EnigmaSuper>, counter: CounterId) -> Self {
        Self { sb, counter }
    }

    fn cell(&self) -> &AtomicCounter {
        self.sb.arena().counter(self.counter)
    }
}

#[async_trait]
impl FileOps for CounterFile {
    async fn read(&self, buf: &mut [u8], count: usize, pos: &mut u64) -> VfsResult<usize> {
        let cell = self.cell();
        let value = if *pos > 0 {
            cell.get().wrapping_sub(1)
        } else {
            cell.increment()
        };

        let (text, len) = render(value);
        let Ok(offset) = usize::try_from(*pos) else {
            return Ok(0);
        };
        if offset > len {
            return Ok(0);
        }
        let count = count.min(len - offset);

        copy_to_user(buf, &text[offset..offset + count])?;
        *pos += count as u64;
        tracing::trace!(value, offset, count, "counter read");
        Ok(count)
    }

    async fn write(&self, buf: &[u8], count: usize, pos: &mut u64) -> VfsResult<usize> {
        if *pos != 0 {
            return Err(VfsError::invalid_argument(format!(
                "counter write at offset {}",
                *pos
            )));
        }
        if count >= COUNTER_BUF_SIZE {
            return Err(VfsError::invalid_argument(format!(
                "counter write of {count} bytes"
            )));
        }

        let mut tmp = [0u8; COUNTER_BUF_SIZE];
        copy_from_user(&mut tmp[..count], buf)?;
        let value = parse(&tmp);
        self.cell().set(value);
        tracing::trace!(value, count, "counter write");
        Ok(count)
    }
}
