//! Integration tests for pathwalk-ops.

use std::collections::BTreeMap;
use std::fs;
use std::thread;
use std::time::{Duration, SystemTime};

use filetime::{FileTime, set_file_mtime};
use pathwalk_ops::*;
use pathwalk_scan::{FilesConfig, walk_files};
use tempfile::TempDir;

#[test]
fn test_concurrent_moves_share_lock() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("incoming");
    let dest = temp.path().join("archive/2024");
    fs::create_dir(&src).unwrap();
    for i in 0..20 {
        let name = format!("file{i}.dat");
        fs::write(src.join(name), format!("{i}")).unwrap();
    }

    let lock = FileLock::new();
    make_path(&lock, &dest).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let lock = lock.clone();
            let src = src.clone();
            let dest = dest.clone();
            thread::spawn(move || {
                for i in (worker..20).step_by(4) {
                    let name = format!("file{i}.dat");
                    move_file(&lock, &src.join(name), &dest).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let moved: Vec<_> = walk_files(FilesConfig::new(&dest))
        .unwrap()
        .paths()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(moved.len(), 20);
    assert_eq!(fs::read_dir(&src).unwrap().count(), 0);
}

#[test]
fn test_remove_walked_files_by_extension() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("a/b")).unwrap();
    for name in ["keep.txt", "drop.tmp", "a/drop.tmp", "a/b/keep.rs", "a/b/drop.tmp"] {
        fs::write(root.join(name), "x").unwrap();
    }

    let config = FilesConfig {
        ext_include: vec![".tmp".to_string()],
        ..FilesConfig::new(root)
    };
    let lock = FileLock::global();
    let targets: Vec<_> = walk_files(config)
        .unwrap()
        .paths()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(targets.len(), 3);
    for path in &targets {
        remove_file(&lock, path).unwrap();
    }

    let mut left: Vec<_> = walk_files(FilesConfig::new(root))
        .unwrap()
        .paths()
        .map(|p| p.unwrap().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    left.sort();
    assert_eq!(left, vec![std::path::PathBuf::from("a/b/keep.rs"), "keep.txt".into()]);
}

#[test]
fn test_json_state_file_round_trip() {
    let temp = TempDir::new().unwrap();
    let state = temp.path().join("state/counts.json");
    let state_dir = state.parent().unwrap();
    make_path(&FileLock::new(), state_dir).unwrap();

    let mut counts: BTreeMap<String, u32> = read_json_from_file(&state).unwrap();
    assert!(counts.is_empty());

    counts.insert("café".to_string(), 3);
    write_json_to_file(&state, &counts).unwrap();
    assert!(fs::read_to_string(&state).unwrap().contains("café"));

    let reread: BTreeMap<String, u32> = read_json_from_file(&state).unwrap();
    assert_eq!(reread, counts);
}

#[test]
fn test_clean_bom_then_grep() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("export.csv");
    fs::write(&file, b"\xef\xbb\xbfid;name\n1;alpha\n2;beta\n").unwrap();

    remove_bom(&file).unwrap();
    replace_in_file(&file, ";", ",", &ReplaceTarget::Backup(".orig".to_string())).unwrap();

    assert_eq!(grep(&file, r"^\d+,").unwrap(), vec!["1,alpha", "2,beta"]);
    assert_eq!(grep(&file, "^id").unwrap(), vec!["id,name"]);
    assert!(temp.path().join("export.csv.orig").exists());
}

#[tokio::test]
async fn test_expire_reports_only_old_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir(root.join("logs")).unwrap();
    let old = root.join("logs/old.log");
    let fresh = root.join("logs/fresh.log");
    fs::write(&old, "0123456789").unwrap();
    fs::write(&fresh, "x").unwrap();
    let when = SystemTime::now() - Duration::from_secs(40 * 24 * 60 * 60);
    set_file_mtime(&old, FileTime::from_system_time(when)).unwrap();

    let options = ExpireOptions {
        mac: MacTime::Modified,
        delta: "30d".parse::<TimestampDelta>().unwrap().negated(),
        dry_run: false,
    };
    let mut rx = start_expire(root.to_path_buf(), options, FileLock::new());

    let mut expired = Vec::new();
    let mut complete = None;
    while let Some(result) = rx.recv().await {
        match result {
            ExpireResult::Expired(path) => expired.push(path),
            ExpireResult::Progress(_) => {}
            ExpireResult::Complete(c) => complete = Some(c),
        }
    }

    let complete = complete.unwrap();
    assert_eq!(expired, vec![old.clone()]);
    assert_eq!(complete.checked, 2);
    assert_eq!(complete.bytes_processed, 10);
    assert_eq!(complete.summary(), "Removed 1 of 2 files");
    assert!(!old.exists());
    assert!(fresh.exists());
}

#[test]
fn test_access_checks_after_creation() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("data");
    assert!(!check_path_access(&dir, AccessCheck::Read));

    make_path(&FileLock::new(), &dir).unwrap();
    assert!(check_path_access(&dir, AccessCheck::Read));
    assert!(check_path_access(&dir, AccessCheck::Write));
}
