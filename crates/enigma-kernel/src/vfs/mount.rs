//! VFS mount table with longest-prefix routing.
//!
//! Mounts filesystem instances at paths and routes path-based requests
//! (`getattr`, `readdir`, `statfs`, `open`) to the instance that owns them.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use enigma_types::{DirEntry, FileAttr, Ino, StatFs};

use super::error::{VfsError, VfsResult};
use super::file::File;
use super::ops::{FileSystemType, SuperOps};
use super::registry::FileSystemRegistry;

/// Information about a mount point.
#[derive(Debug, Clone)]
pub struct MountInfo {
    /// The mount path (e.g., "/mnt/enigma").
    pub path: PathBuf,
    /// Name of the filesystem type mounted there.
    pub fs_type: String,
    /// Device argument given at mount time, if any.
    pub dev_name: Option<String>,
}

struct Mounted {
    fs_type: Arc<dyn FileSystemType>,
    sb: Arc<dyn SuperOps>,
    dev_name: Option<String>,
}

/// Mounted instances, keyed by mount path.
///
/// Mount points are matched by longest prefix. For example, if `/mnt` and
/// `/mnt/enigma` are both mounted, a path like `/mnt/enigma/counter` will be
/// routed to the `/mnt/enigma` mount. A mount point holds at most one
/// instance.
pub struct MountTable {
    registry: Arc<FileSystemRegistry>,
    /// Mount points, keyed by normalized path.
    mounts: RwLock<BTreeMap<PathBuf, Mounted>>,
}

impl std::fmt::Debug for MountTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountTable")
            .field("registry", &self.registry)
            .field("mounts", &"<locked>")
            .finish()
    }
}

impl MountTable {
    /// Create an empty mount table that resolves types through `registry`.
    pub fn new(registry: Arc<FileSystemRegistry>) -> Self {
        Self {
            registry,
            mounts: RwLock::new(BTreeMap::new()),
        }
    }

    /// The registry this table mounts from.
    pub fn registry(&self) -> &Arc<FileSystemRegistry> {
        &self.registry
    }

    /// Mount a new instance of `fs_type` at `path`.
    ///
    /// Fails with [`VfsError::Busy`] if something is already mounted at
    /// `path`, [`VfsError::NoSuchFileSystem`] if the type is unknown, or with
    /// whatever the driver's `mount` returns. On failure nothing is added.
    pub async fn mount(
        &self,
        path: impl Into<PathBuf>,
        fs_type: &str,
        dev_name: Option<&str>,
    ) -> VfsResult<()> {
        let path = Self::normalize_mount_path(path.into());
        let mut mounts = self.mounts.write().await;
        if mounts.contains_key(&path) {
            return Err(VfsError::busy(path.display().to_string()));
        }

        let fs = self.registry.get(fs_type)?;
        let sb = fs.mount(dev_name).await?;
        tracing::info!(path = %path.display(), fs_type, "mounted");
        mounts.insert(
            path,
            Mounted {
                fs_type: fs,
                sb,
                dev_name: dev_name.map(str::to_string),
            },
        );
        Ok(())
    }

    /// Unmount the instance at the given path.
    ///
    /// Returns `true` if a mount was removed, `false` if nothing was mounted
    /// there. Descriptors opened before the unmount stay usable until they
    /// are dropped.
    pub async fn unmount(&self, path: impl AsRef<Path>) -> bool {
        let path = Self::normalize_mount_path(path.as_ref().to_path_buf());
        let removed = self.mounts.write().await.remove(&path);
        match removed {
            Some(mounted) => {
                mounted.fs_type.kill_sb(mounted.sb.as_ref());
                tracing::info!(path = %path.display(), "unmounted");
                true
            }
            None => false,
        }
    }

    /// List all current mounts.
    pub async fn list_mounts(&self) -> Vec<MountInfo> {
        let mounts = self.mounts.read().await;
        mounts
            .iter()
            .map(|(path, mounted)| MountInfo {
                path: path.clone(),
                fs_type: mounted.fs_type.name().to_string(),
                dev_name: mounted.dev_name.clone(),
            })
            .collect()
    }

    /// Attributes of the node at `path`.
    pub async fn getattr(&self, path: impl AsRef<Path>) -> VfsResult<FileAttr> {
        let (sb, ino) = self.resolve(path.as_ref()).await?;
        sb.getattr(ino)
    }

    /// Entries of the directory at `path`.
    pub async fn readdir(&self, path: impl AsRef<Path>) -> VfsResult<Vec<DirEntry>> {
        let (sb, ino) = self.resolve(path.as_ref()).await?;
        sb.readdir(ino)
    }

    /// Statistics of the instance that owns `path`.
    pub async fn statfs(&self, path: impl AsRef<Path>) -> VfsResult<StatFs> {
        let (sb, _) = self.find_mount(path.as_ref()).await?;
        Ok(sb.statfs())
    }

    /// Open the node at `path`.
    pub async fn open(&self, path: impl AsRef<Path>) -> VfsResult<File> {
        let path = path.as_ref();
        let (sb, ino) = self.resolve(path).await?;
        let ops = sb.open(ino)?;
        tracing::debug!(path = %path.display(), %ino, "opened");
        Ok(File::new(path.to_path_buf(), ops))
    }

    /// Normalize a mount path: ensure it starts with `/` and has no trailing slash.
    fn normalize_mount_path(path: PathBuf) -> PathBuf {
        let s = path.to_string_lossy();
        let s = s.trim_end_matches('/');
        if s.is_empty() {
            PathBuf::from("/")
        } else if !s.starts_with('/') {
            PathBuf::from(format!("/{}", s))
        } else {
            PathBuf::from(s)
        }
    }

    /// Find the mount point for a given path.
    ///
    /// Returns the instance and the path relative to its root.
    async fn find_mount(&self, path: &Path) -> VfsResult<(Arc<dyn SuperOps>, PathBuf)> {
        let path_str = path.to_string_lossy();
        let normalized = if path_str.starts_with('/') {
            path_str.into_owned()
        } else {
            format!("/{}", path_str)
        };

        let mounts = self.mounts.read().await;

        let best_match = mounts
            .iter()
            .filter(|(mount_path, _)| {
                let mount_str = mount_path.to_string_lossy();
                mount_str == "/"
                    || normalized == mount_str
                    || normalized.starts_with(&format!("{}/", mount_str))
            })
            .max_by_key(|(mount_path, _)| mount_path.as_os_str().len());

        match best_match {
            Some((mount_path, mounted)) => {
                let mount_str = mount_path.to_string_lossy();
                let relative = if mount_str == "/" {
                    normalized.trim_start_matches('/')
                } else {
                    normalized
                        .strip_prefix(mount_str.as_ref())
                        .unwrap_or("")
                        .trim_start_matches('/')
                };
                Ok((Arc::clone(&mounted.sb), PathBuf::from(relative)))
            }
            None => Err(VfsError::no_mount_point(path.display().to_string())),
        }
    }

    /// Walk `path` down from its instance's root.
    ///
    /// `..` never climbs above the mount root.
    async fn resolve(&self, path: &Path) -> VfsResult<(Arc<dyn SuperOps>, Ino)> {
        let (sb, relative) = self.find_mount(path).await?;
        let mut stack = vec![sb.root()];
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name
                        .to_str()
                        .ok_or_else(|| VfsError::invalid_path(path.display().to_string()))?;
                    let dir = *stack.last().unwrap_or(&sb.root());
                    stack.push(sb.lookup(dir, name)?);
                }
                Component::ParentDir => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        let ino = *stack.last().unwrap_or(&sb.root());
        Ok((sb, ino))
    }
}
