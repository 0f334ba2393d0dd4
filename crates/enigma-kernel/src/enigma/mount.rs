//! Mount controller.
//!
//! [`EnigmaSuper`] is one mounted instance: it owns the arena holding the
//! whole tree and answers the host's namespace calls. [`EnigmaFs`] is the
//! filesystem type the host mounts from, and [`EnigmaModule`] ties the type's
//! registration to a load/unload lifetime.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use enigma_types::{DirEntry, FileAttr, FileMode, Ino, StatFs};

use super::arena::{Arena, EntryId};
use super::counter::CounterFile;
use super::linker::{create_dir_entry, create_file_entry, link_entry};
use super::node::{NodeOps, make_node};
use crate::config::EnigmaConfig;
use crate::constants::{DIR_PERM, NAME_MAX, ROOT_COUNTER_NAME, SUB_COUNTER_NAME, SUBDIR_NAME};
use crate::vfs::{
    FileOps, FileSystemRegistry, FileSystemType, SimpleDirFile, SuperOps, VfsError, VfsResult,
};

/// A mounted enigma instance.
#[derive(Debug)]
pub struct EnigmaSuper {
    magic: u32,
    block_size: u32,
    block_size_bits: u8,
    arena: Arena,
    root: EntryId,
    alive: AtomicBool,
}

impl EnigmaSuper {
    /// Build a fresh instance: root directory first, then the fixed layout.
    ///
    /// Only a failure to create the root fails the mount; a missing leaf or
    /// subdirectory leaves a smaller tree behind.
    pub fn fill_super(config: &EnigmaConfig) -> VfsResult<Self> {
        let mut arena = Arena::new(config.limits());

        let root_node = make_node(&mut arena, FileMode::directory(DIR_PERM), NodeOps::SimpleDir)?;
        arena.node_mut(root_node).set_nlink(2);
        let root = link_entry(&mut arena, None, "/", root_node)?;

        create_files(&mut arena, root);

        tracing::debug!(
            nodes = arena.node_count(),
            entries = arena.entry_count(),
            "filled superblock"
        );
        Ok(Self {
            magic: config.magic,
            block_size: config.block_size,
            block_size_bits: config.block_size_bits,
            arena,
            root,
            alive: AtomicBool::new(true),
        })
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Current value of the counter behind a counter file, without the
    /// read side effect.
    pub fn peek_counter(&self, ino: Ino) -> VfsResult<i32> {
        let (_, node) = self.arena.node_by_ino(ino)?;
        match node.ops() {
            NodeOps::CounterFile(counter) => Ok(self.arena.counter(counter).get()),
            NodeOps::SimpleDir => Err(VfsError::is_a_directory(self.name_of(ino)?)),
        }
    }

    fn dir_entry(&self, ino: Ino) -> VfsResult<EntryId> {
        let (_, node) = self.arena.node_by_ino(ino)?;
        let entry = node
            .dentry()
            .ok_or_else(|| VfsError::not_found(format!("ino {ino}")))?;
        if !node.ops().is_dir() {
            return Err(VfsError::not_a_directory(self.arena.entry(entry).name()));
        }
        Ok(entry)
    }

    fn name_of(&self, ino: Ino) -> VfsResult<String> {
        let (_, node) = self.arena.node_by_ino(ino)?;
        Ok(node
            .dentry()
            .map(|entry| self.arena.entry(entry).name().to_string())
            .unwrap_or_default())
    }
}

/// Lay out the fixed tree under `root`. Each counter starts at 0.
fn create_files(arena: &mut Arena, root: EntryId) {
    let counter = arena.add_counter();
    if let Err(err) = create_file_entry(arena, root, ROOT_COUNTER_NAME, counter) {
        tracing::warn!(name = ROOT_COUNTER_NAME, %err, "skipping counter file");
    }

    let subcounter = arena.add_counter();
    match create_dir_entry(arena, root, SUBDIR_NAME) {
        Ok(subdir) => {
            if let Err(err) = create_file_entry(arena, subdir, SUB_COUNTER_NAME, subcounter) {
                tracing::warn!(name = SUB_COUNTER_NAME, %err, "skipping counter file");
            }
        }
        Err(err) => tracing::warn!(name = SUBDIR_NAME, %err, "skipping subdirectory"),
    }
}

impl SuperOps for EnigmaSuper {
    fn root(&self) -> Ino {
        self.arena.entry(self.root).node().ino()
    }

    fn lookup(&self, dir: Ino, name: &str) -> VfsResult<Ino> {
        let dir = self.dir_entry(dir)?;
        self.arena
            .entry(dir)
            .children()
            .iter()
            .map(|&child| self.arena.entry(child))
            .find(|child| child.name() == name)
            .map(|child| child.node().ino())
            .ok_or_else(|| VfsError::not_found(name))
    }

    fn getattr(&self, ino: Ino) -> VfsResult<FileAttr> {
        let (_, node) = self.arena.node_by_ino(ino)?;
        Ok(node.attr(self.block_size))
    }

    fn readdir(&self, dir: Ino) -> VfsResult<Vec<DirEntry>> {
        let dir = self.dir_entry(dir)?;
        let mut entries: Vec<DirEntry> = self
            .arena
            .entry(dir)
            .children()
            .iter()
            .map(|&child| {
                let child = self.arena.entry(child);
                let node = self.arena.node(child.node());
                DirEntry::new(child.name(), node.ino(), node.attr(self.block_size).kind)
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn statfs(&self) -> StatFs {
        StatFs {
            magic: self.magic,
            bsize: self.block_size,
            namelen: NAME_MAX,
            bsize_bits: self.block_size_bits,
            files: self.arena.node_count() as u64,
            ..StatFs::default()
        }
    }

    fn open(self: Arc<Self>, ino: Ino) -> VfsResult<Box<dyn FileOps>> {
        let ops = self.arena.node_by_ino(ino)?.1.ops();
        match ops {
            NodeOps::SimpleDir => Ok(Box::new(SimpleDirFile::new(self.name_of(ino)?))),
            NodeOps::CounterFile(counter) => Ok(Box::new(CounterFile::open(self, counter))),
        }
    }

    fn deactivate(&self) -> bool {
        let was_alive = self.alive.swap(false, Ordering::SeqCst);
        if was_alive {
            tracing::debug!(nodes = self.arena.node_count(), "instance detached");
        }
        was_alive
    }
}

impl Drop for EnigmaSuper {
    fn drop(&mut self) {
        tracing::debug!(nodes = self.arena.node_count(), "instance released");
    }
}

/// The enigma filesystem type.
#[derive(Debug)]
pub struct EnigmaFs {
    config: EnigmaConfig,
    active: AtomicUsize,
}

impl EnigmaFs {
    pub fn new(config: EnigmaConfig) -> Self {
        Self {
            config,
            active: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &EnigmaConfig {
        &self.config
    }

    /// Instances mounted and not yet killed.
    pub fn active_instances(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileSystemType for EnigmaFs {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn mount(&self, dev_name: Option<&str>) -> VfsResult<Arc<dyn SuperOps>> {
        if let Some(dev) = dev_name {
            tracing::debug!(dev, "ignoring device argument");
        }
        let sb = EnigmaSuper::fill_super(&self.config)?;
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(fs_type = %self.config.name, active, "instance mounted");
        Ok(Arc::new(sb))
    }

    fn kill_sb(&self, sb: &dyn SuperOps) {
        if !sb.deactivate() {
            return;
        }
        let killed = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match killed {
            Ok(prev) => {
                tracing::info!(fs_type = %self.config.name, active = prev - 1, "instance killed");
            }
            Err(_) => tracing::warn!(
                fs_type = %self.config.name,
                "kill_sb on an instance this type did not mount"
            ),
        }
    }
}

/// Registration of the enigma type with a host registry.
///
/// The type is registered by [`EnigmaModule::load`] and stays registered
/// until [`EnigmaModule::unload`] succeeds or the module is dropped.
#[derive(Debug)]
pub struct EnigmaModule {
    registry: Arc<FileSystemRegistry>,
    fs: Arc<EnigmaFs>,
    registered: bool,
}

impl EnigmaModule {
    /// Register the type described by `config` with `registry`.
    pub fn load(registry: Arc<FileSystemRegistry>, config: EnigmaConfig) -> VfsResult<Self> {
        config
            .validate()
            .map_err(|err| VfsError::invalid_argument(err.to_string()))?;
        let fs = Arc::new(EnigmaFs::new(config));
        registry.register(fs.clone())?;
        Ok(Self {
            registry,
            fs,
            registered: true,
        })
    }

    pub fn fs(&self) -> &Arc<EnigmaFs> {
        &self.fs
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Remove the registration. Fails with [`VfsError::Busy`] while any
    /// instance is still mounted.
    pub fn unload(&mut self) -> VfsResult<()> {
        if !self.registered {
            return Ok(());
        }
        let active = self.fs.active_instances();
        if active > 0 {
            return Err(VfsError::busy(format!(
                "{} has {active} mounted instance(s)",
                self.fs.name()
            )));
        }
        self.registry.unregister_fs(&self.handle());
        self.registered = false;
        Ok(())
    }

    fn handle(&self) -> Arc<dyn FileSystemType> {
        self.fs.clone()
    }
}

impl Drop for EnigmaModule {
    fn drop(&mut self) {
        if self.registered {
            let active = self.fs.active_instances();
            if active > 0 {
                tracing::warn!(fs_type = %self.fs.name(), active, "dropping module with mounted instances");
            }
            self.registry.unregister_fs(&self.handle());
        }
    }
}
