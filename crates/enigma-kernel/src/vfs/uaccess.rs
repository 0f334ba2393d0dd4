//! Copies between driver memory and caller buffers.

use super::{VfsError, VfsResult};

/// Deliver `src` into the front of `dst`.
///
/// Fails with [`VfsError::Fault`] when `dst` cannot hold all of `src`;
/// nothing is copied in that case.
pub fn copy_to_user(dst: &mut [u8], src: &[u8]) -> VfsResult<()> {
    let Some(dst) = dst.get_mut(..src.len()) else {
        return Err(VfsError::Fault);
    };
    dst.copy_from_slice(src);
    Ok(())
}

/// Fill `dst` from the front of `src`.
///
/// Fails with [`VfsError::Fault`] when `src` holds fewer bytes than `dst`.
pub fn copy_from_user(dst: &mut [u8], src: &[u8]) -> VfsResult<()> {
    let Some(src) = src.get(..dst.len()) else {
        return Err(VfsError::Fault);
    };
    dst.copy_from_slice(src);
    Ok(())
}
