//! POSIX mode bits.

bitflags::bitflags! {
    /// File type and permission bits, laid out as in `st_mode`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FileMode: u32 {
        /// File type mask.
        const S_IFMT   = 0o170000;
        /// Regular file.
        const S_IFREG  = 0o100000;
        /// Directory.
        const S_IFDIR  = 0o040000;

        /// Owner read.
        const S_IRUSR  = 0o400;
        /// Owner write.
        const S_IWUSR  = 0o200;
        /// Owner execute.
        const S_IXUSR  = 0o100;
        /// Group read.
        const S_IRGRP  = 0o040;
        /// Group write.
        const S_IWGRP  = 0o020;
        /// Group execute.
        const S_IXGRP  = 0o010;
        /// Others read.
        const S_IROTH  = 0o004;
        /// Others write.
        const S_IWOTH  = 0o002;
        /// Others execute.
        const S_IXOTH  = 0o001;
    }
}

impl FileMode {
    /// A regular file with the given permission bits.
    pub fn regular(perm: u32) -> Self {
        Self::S_IFREG | Self::from_bits_truncate(perm & 0o777)
    }

    /// A directory with the given permission bits.
    pub fn directory(perm: u32) -> Self {
        Self::S_IFDIR | Self::from_bits_truncate(perm & 0o777)
    }

    /// Only the type bits.
    pub fn file_type_bits(self) -> Self {
        self & Self::S_IFMT
    }

    /// Only the permission bits, as a raw number (e.g. `0o644`).
    pub fn perm(self) -> u32 {
        self.bits() & 0o777
    }

    pub fn is_dir(self) -> bool {
        self.file_type_bits() == Self::S_IFDIR
    }

    pub fn is_regular(self) -> bool {
        self.file_type_bits() == Self::S_IFREG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_constructors() {
        let file = FileMode::regular(0o644);
        assert!(file.is_regular());
        assert!(!file.is_dir());
        assert_eq!(file.perm(), 0o644);
        assert_eq!(file.bits(), 0o100644);

        let dir = FileMode::directory(0o755);
        assert!(dir.is_dir());
        assert_eq!(dir.bits(), 0o040755);
    }

    #[test]
    fn test_perm_masks_type_bits() {
        assert_eq!(FileMode::regular(0o170644).perm(), 0o644);
        assert!(FileMode::regular(0o040644).is_regular());
    }
}
