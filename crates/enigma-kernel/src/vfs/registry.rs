//! Filesystem type registry.
//!
//! Maps type names to drivers. A name can be registered once; mounting
//! looks the driver up by name.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::{VfsError, VfsResult};
use super::ops::FileSystemType;

/// Registered filesystem types, keyed by name.
#[derive(Default)]
pub struct FileSystemRegistry {
    types: RwLock<BTreeMap<String, Arc<dyn FileSystemType>>>,
}

impl std::fmt::Debug for FileSystemRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemRegistry")
            .field("types", &self.names())
            .finish()
    }
}

impl FileSystemRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filesystem type under its own name.
    ///
    /// Fails with [`VfsError::Busy`] if the name is already taken.
    pub fn register(&self, fs_type: Arc<dyn FileSystemType>) -> VfsResult<()> {
        let name = fs_type.name().to_string();
        let mut types = self.types.write();
        if types.contains_key(&name) {
            return Err(VfsError::busy(format!("filesystem type {name} already registered")));
        }
        tracing::info!(fs_type = %name, "registered filesystem type");
        types.insert(name, fs_type);
        Ok(())
    }

    /// Remove a registration.
    ///
    /// Returns `true` if the name was registered.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.types.write().remove(name).is_some();
        if removed {
            tracing::info!(fs_type = %name, "unregistered filesystem type");
        }
        removed
    }

    /// Remove `fs_type`'s registration, leaving the name alone if it now
    /// belongs to a different driver.
    ///
    /// Returns `true` if the registration was removed.
    pub fn unregister_fs(&self, fs_type: &Arc<dyn FileSystemType>) -> bool {
        let name = fs_type.name();
        let mut types = self.types.write();
        match types.get(name) {
            Some(current) if Arc::ptr_eq(current, fs_type) => {
                types.remove(name);
                tracing::info!(fs_type = %name, "unregistered filesystem type");
                true
            }
            _ => false,
        }
    }

    /// Look a type up by name.
    pub fn get(&self, name: &str) -> VfsResult<Arc<dyn FileSystemType>> {
        self.types
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| VfsError::NoSuchFileSystem(name.to_string()))
    }

    /// Names of all registered types, sorted.
    pub fn names(&self) -> Vec<String> {
        self.types.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::SuperOps;
    use async_trait::async_trait;

    struct NullFs(&'static str);

    #[async_trait]
    impl FileSystemType for NullFs {
        fn name(&self) -> &str {
            self.0
        }

        async fn mount(&self, _dev_name: Option<&str>) -> VfsResult<Arc<dyn SuperOps>> {
            Err(VfsError::other("null filesystem cannot be mounted"))
        }

        fn kill_sb(&self, _sb: &dyn SuperOps) {}
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = FileSystemRegistry::new();
        registry.register(Arc::new(NullFs("null"))).unwrap();

        assert_eq!(registry.get("null").unwrap().name(), "null");
        assert_eq!(registry.names(), vec!["null".to_string()]);
        assert!(matches!(
            registry.get("other"),
            Err(VfsError::NoSuchFileSystem(_))
        ));
    }

    #[test]
    fn test_duplicate_name_is_busy() {
        let registry = FileSystemRegistry::new();
        registry.register(Arc::new(NullFs("null"))).unwrap();
        assert!(matches!(
            registry.register(Arc::new(NullFs("null"))),
            Err(VfsError::Busy(_))
        ));
    }

    #[test]
    fn test_unregister() {
        let registry = FileSystemRegistry::new();
        registry.register(Arc::new(NullFs("null"))).unwrap();

        assert!(registry.unregister("null"));
        assert!(!registry.unregister("null"));
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_unregister_fs_checks_identity() {
        let registry = FileSystemRegistry::new();
        let old: Arc<dyn FileSystemType> = Arc::new(NullFs("null"));
        let new: Arc<dyn FileSystemType> = Arc::new(NullFs("null"));
        registry.register(old.clone()).unwrap();
        registry.unregister("null");
        registry.register(new.clone()).unwrap();

        assert!(!registry.unregister_fs(&old));
        assert_eq!(registry.names(), vec!["null".to_string()]);
        assert!(registry.unregister_fs(&new));
        assert!(registry.names().is_empty());
    }
}
