//! End-to-end tests for the enigma driver mounted through the host boundary.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use enigma_kernel::{
    EnigmaConfig, EnigmaModule, FileSystemRegistry, FileType, Limits, MountTable, VfsError,
};
use tracing_subscriber::EnvFilter;

const MNT: &str = "/mnt/enigma";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Load the module into a fresh host and mount one instance at [`MNT`].
async fn mounted(config: EnigmaConfig) -> (MountTable, EnigmaModule) {
    init_tracing();
    let registry = Arc::new(FileSystemRegistry::new());
    let module = EnigmaModule::load(registry.clone(), config).unwrap();
    let table = MountTable::new(registry);
    let fs_type = module.fs().config().name.clone();
    table.mount(MNT, &fs_type, None).await.unwrap();
    (table, module)
}

async fn read_file(table: &MountTable, path: &str) -> String {
    let mut file = table.open(path).await.unwrap();
    String::from_utf8(file.read_to_end().await.unwrap()).unwrap()
}

async fn write_file(table: &MountTable, path: &str, text: &str) {
    let mut file = table.open(path).await.unwrap();
    let n = file.write(text.as_bytes(), text.len()).await.unwrap();
    assert_eq!(n, text.len());
}

async fn list(table: &MountTable, path: &str) -> Vec<String> {
    table
        .readdir(path)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}

#[tokio::test]
async fn test_fresh_mount_reads_zero() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "0\n");
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "1\n");
}

#[tokio::test]
async fn test_each_read_cycle_increments_once() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    for k in 1..=10 {
        let text = read_file(&table, "/mnt/enigma/subdir/subcounter").await;
        assert_eq!(text, format!("{}\n", k - 1));
    }
}

#[tokio::test]
async fn test_partial_reads_report_one_value() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    write_file(&table, "/mnt/enigma/counter", "12345").await;

    let mut file = table.open("/mnt/enigma/counter").await.unwrap();
    let mut text = Vec::new();
    let mut byte = [0u8; 1];
    while file.read(&mut byte, 1).await.unwrap() == 1 {
        text.push(byte[0]);
    }
    assert_eq!(text, b"12345\n");
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "12346\n");
}

#[tokio::test]
async fn test_write_then_read() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    write_file(&table, "/mnt/enigma/counter", "42").await;
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "42\n");
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "43\n");
}

#[tokio::test]
async fn test_write_at_offset_rejected() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    write_file(&table, "/mnt/enigma/counter", "7").await;

    let mut file = table.open("/mnt/enigma/counter").await.unwrap();
    file.seek(1);
    let err = file.write(b"9", 1).await.unwrap_err();
    assert!(matches!(err, VfsError::InvalidArgument(_)));
    assert_eq!(err.errno(), 22);

    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "7\n");
}

#[tokio::test]
async fn test_write_does_not_advance_position() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    let mut file = table.open("/mnt/enigma/counter").await.unwrap();
    file.write(b"1", 1).await.unwrap();
    file.write(b"2", 1).await.unwrap();
    assert_eq!(file.position(), 0);
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "2\n");
}

#[tokio::test]
async fn test_write_capacity() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    let mut file = table.open("/mnt/enigma/counter").await.unwrap();

    let twenty = "1".repeat(20);
    assert!(matches!(
        file.write(twenty.as_bytes(), 20).await,
        Err(VfsError::InvalidArgument(_))
    ));
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "0\n");

    let nineteen = format!("{:0>19}", 5);
    assert_eq!(file.write(nineteen.as_bytes(), 19).await.unwrap(), 19);
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "5\n");
}

#[tokio::test]
async fn test_short_buffers_fault() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    let mut file = table.open("/mnt/enigma/counter").await.unwrap();

    let err = file.write(b"42", 8).await.unwrap_err();
    assert!(matches!(err, VfsError::Fault));
    assert_eq!(err.errno(), 14);

    let mut buf = [0u8; 1];
    assert!(matches!(file.read(&mut buf, 2).await, Err(VfsError::Fault)));
    assert_eq!(file.position(), 0);
}

#[tokio::test]
async fn test_integer_semantics() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;

    write_file(&table, "/mnt/enigma/counter", "-8xyz").await;
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "-8\n");

    write_file(&table, "/mnt/enigma/counter", "garbage").await;
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "0\n");

    write_file(&table, "/mnt/enigma/counter", "2147483647").await;
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "2147483647\n");
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "-2147483648\n");
}

#[tokio::test]
async fn test_counters_are_independent() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    write_file(&table, "/mnt/enigma/counter", "100").await;
    read_file(&table, "/mnt/enigma/counter").await;
    read_file(&table, "/mnt/enigma/counter").await;

    assert_eq!(read_file(&table, "/mnt/enigma/subdir/subcounter").await, "0\n");
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "102\n");
}

#[tokio::test]
async fn test_directory_listing() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    assert_eq!(list(&table, MNT).await, vec!["counter", "subdir"]);
    assert_eq!(list(&table, "/mnt/enigma/subdir").await, vec!["subcounter"]);

    let entries = table.readdir(MNT).await.unwrap();
    assert_eq!(entries[0].kind, FileType::File);
    assert_eq!(entries[1].kind, FileType::Directory);

    let attr = table.getattr("/mnt/enigma/counter").await.unwrap();
    assert_eq!(attr.mode, 0o100644);
    assert_eq!(attr.size, 0);
    let attr = table.getattr("/mnt/enigma/subdir").await.unwrap();
    assert_eq!(attr.mode, 0o040755);
    assert_eq!(attr.nlink, 2);
}

#[tokio::test]
async fn test_directory_descriptor_rejects_io() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    let mut dir = table.open("/mnt/enigma/subdir").await.unwrap();
    let mut buf = [0u8; 8];
    let err = dir.read(&mut buf, 8).await.unwrap_err();
    assert!(matches!(err, VfsError::IsADirectory(_)));
    assert_eq!(err.errno(), 21);
}

#[tokio::test]
async fn test_statfs() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    let stat = table.statfs("/mnt/enigma/subdir/subcounter").await.unwrap();
    assert_eq!(stat.magic, 0x19920342);
    assert_eq!(stat.bsize, 4096);
    assert_eq!(stat.namelen, 255);
    assert_eq!(stat.bsize_bits, 12);
    assert_eq!(stat.files, 4);
}

#[tokio::test]
async fn test_remount_resets_counters() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    write_file(&table, "/mnt/enigma/counter", "9").await;
    read_file(&table, "/mnt/enigma/subdir/subcounter").await;

    assert!(table.unmount(MNT).await);
    table.mount(MNT, "enigma", None).await.unwrap();

    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "0\n");
    assert_eq!(read_file(&table, "/mnt/enigma/subdir/subcounter").await, "0\n");
}

#[tokio::test]
async fn test_instances_do_not_share_counters() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    table.mount("/mnt/other", "enigma", None).await.unwrap();

    write_file(&table, "/mnt/enigma/counter", "50").await;
    assert_eq!(read_file(&table, "/mnt/other/counter").await, "0\n");
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "50\n");
}

#[tokio::test]
async fn test_unmount_is_lazy_for_open_descriptors() {
    let (table, module) = mounted(EnigmaConfig::default()).await;
    let mut file = table.open("/mnt/enigma/counter").await.unwrap();

    assert!(table.unmount(MNT).await);
    assert_eq!(module.fs().active_instances(), 0);
    assert!(matches!(
        table.getattr("/mnt/enigma/counter").await,
        Err(VfsError::NoMountPoint(_))
    ));

    assert_eq!(file.read_to_end().await.unwrap(), b"0\n");
}

#[tokio::test]
async fn test_module_unload_busy_while_mounted() {
    let (table, mut module) = mounted(EnigmaConfig::default()).await;

    let err = module.unload().unwrap_err();
    assert!(matches!(err, VfsError::Busy(_)));
    assert_eq!(err.errno(), 16);

    table.unmount(MNT).await;
    module.unload().unwrap();
    assert!(table.registry().names().is_empty());
    assert!(matches!(
        table.mount(MNT, "enigma", None).await,
        Err(VfsError::NoSuchFileSystem(_))
    ));
}

#[tokio::test]
async fn test_mount_point_holds_one_instance() {
    let (table, module) = mounted(EnigmaConfig::default()).await;
    assert!(matches!(
        table.mount(MNT, "enigma", None).await,
        Err(VfsError::Busy(_))
    ));
    assert_eq!(module.fs().active_instances(), 1);
    assert_eq!(table.list_mounts().await.len(), 1);
}

#[tokio::test]
async fn test_allocation_budgets_degrade_the_tree() {
    let config = EnigmaConfig::default().with_limits(Limits {
        max_nodes: Some(3),
        max_entries: None,
    });
    let (table, _module) = mounted(config).await;
    assert_eq!(list(&table, MNT).await, vec!["counter", "subdir"]);
    assert!(list(&table, "/mnt/enigma/subdir").await.is_empty());
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "0\n");

    let config = EnigmaConfig::default().with_limits(Limits {
        max_nodes: None,
        max_entries: Some(2),
    });
    let (table, _module) = mounted(config).await;
    assert_eq!(list(&table, MNT).await, vec!["counter"]);
}

#[tokio::test]
async fn test_root_allocation_failure_fails_mount() {
    init_tracing();
    let registry = Arc::new(FileSystemRegistry::new());
    let config = EnigmaConfig::default().with_limits(Limits {
        max_nodes: Some(0),
        max_entries: None,
    });
    let module = EnigmaModule::load(registry.clone(), config).unwrap();
    let table = MountTable::new(registry);

    let err = table.mount(MNT, "enigma", None).await.unwrap_err();
    assert!(matches!(err, VfsError::OutOfMemory));
    assert_eq!(err.errno(), 12);
    assert!(table.list_mounts().await.is_empty());
    assert_eq!(module.fs().active_instances(), 0);
}

#[tokio::test]
async fn test_config_file_names_the_type() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name = \"enigma-alt\"").unwrap();
    writeln!(file, "magic = 0x1234").unwrap();
    let config = EnigmaConfig::load(file.path()).unwrap();

    let (table, _module) = mounted(config).await;
    assert_eq!(table.list_mounts().await[0].fs_type, "enigma-alt");
    assert_eq!(table.statfs(MNT).await.unwrap().magic, 0x1234);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_see_unique_values() {
    let (table, _module) = mounted(EnigmaConfig::default()).await;
    let table = Arc::new(table);

    let tasks: Vec<_> = (0..64)
        .map(|_| {
            let table = Arc::clone(&table);
            tokio::spawn(async move {
                let mut file = table.open("/mnt/enigma/counter").await.unwrap();
                let text = String::from_utf8(file.read_to_end().await.unwrap()).unwrap();
                text.trim_end().parse::<i32>().unwrap()
            })
        })
        .collect();

    let mut seen = BTreeSet::new();
    for task in tasks {
        assert!(seen.insert(task.await.unwrap()));
    }
    assert_eq!(seen, (0..64).collect::<BTreeSet<_>>());
    assert_eq!(read_file(&table, "/mnt/enigma/counter").await, "64\n");
}
