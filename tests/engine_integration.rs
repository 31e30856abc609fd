//! End-to-end runs through the engine with real directories and a scripted shell.

use cache_sweeper::events::{CleanComplete, EngineEvent, ScanComplete};
use cache_sweeper::shell::{ShellOutput, ShellRunner};
use cache_sweeper::targets::{FilePattern, Method, Registry, SafetyClass, Target};
use cache_sweeper::trash::{EMPTY_SCRIPT, SIZE_SCRIPT};
use cache_sweeper::{CancellationToken, Engine};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Answers trash scripts from queues; an exhausted queue reads as a failed call.
#[derive(Default)]
struct ScriptedShell {
    sizes: Mutex<VecDeque<&'static str>>,
    empties: Mutex<VecDeque<&'static str>>,
}

impl ScriptedShell {
    fn new(sizes: &[&'static str], empties: &[&'static str]) -> Self {
        Self {
            sizes: Mutex::new(sizes.iter().copied().collect()),
            empties: Mutex::new(empties.iter().copied().collect()),
        }
    }
}

impl ShellRunner for ScriptedShell {
    fn run(&self, script: &str) -> ShellOutput {
        let queue = if script == SIZE_SCRIPT {
            &self.sizes
        } else if script == EMPTY_SCRIPT {
            &self.empties
        } else {
            return ShellOutput::failed();
        };

        match queue.lock().unwrap().pop_front() {
            Some(stdout) => ShellOutput {
                ok: true,
                stdout: stdout.to_string(),
            },
            None => ShellOutput::failed(),
        }
    }
}

fn write(path: &Path, len: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![b'x'; len]).unwrap();
}

fn dir_target(id: &str, path: &Path) -> Target {
    Target::new(
        id,
        id,
        SafetyClass::Safe,
        Method::PlainDirectory {
            path: path.to_path_buf(),
        },
        "",
    )
}

fn engine(targets: Vec<Target>, shell: ScriptedShell) -> Engine {
    Engine::new(Registry::from_targets(targets).unwrap(), Arc::new(shell))
}

fn scan(engine: &Engine) -> (Vec<EngineEvent>, ScanComplete) {
    let mut events = Vec::new();
    let complete = engine.run_scan(&engine.begin_scan(), |e| events.push(e));
    (events, complete)
}

fn clean(engine: &Engine, ids: &[&str]) -> (Vec<EngineEvent>, CleanComplete) {
    let ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
    let mut events = Vec::new();
    let complete = engine.run_clean(&ids, &engine.begin_clean(), |e| events.push(e));
    (events, complete)
}

fn progress_percents(events: &[EngineEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::ScanProgress(p) | EngineEvent::CleanProgress(p) => Some(p.percent),
            _ => None,
        })
        .collect()
}

#[test]
fn plain_directory_scan_then_clean() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    write(&cache.join("a.bin"), 100);
    write(&cache.join("sub/b.bin"), 200);

    let engine = engine(vec![dir_target("cache", &cache)], ScriptedShell::default());

    let (_, scanned) = scan(&engine);
    assert!(!scanned.aborted);
    assert_eq!(scanned.items[0].size_bytes, 300);

    let (_, cleaned) = clean(&engine, &["cache"]);
    assert!(!cleaned.aborted);
    assert_eq!(cleaned.freed_bytes, 300);
    assert_eq!(cleaned.details[0].reclaimed_bytes, 300);
    assert!(cleaned.details[0].succeeded);

    let (_, rescanned) = scan(&engine);
    assert_eq!(rescanned.items[0].size_bytes, 0);
    assert!(cache.is_dir());
}

#[test]
fn second_clean_reclaims_nothing() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    write(&cache.join("a.bin"), 4096);

    let engine = engine(vec![dir_target("cache", &cache)], ScriptedShell::default());

    let (_, first) = clean(&engine, &["cache"]);
    let (_, second) = clean(&engine, &["cache"]);

    assert_eq!(first.freed_bytes, 4096);
    assert!(second.details[0].succeeded);
    assert_eq!(second.details[0].reclaimed_bytes, 0);
}

#[test]
fn pattern_match_cleans_only_matching_files() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("thumbcache001.db"), 50);
    write(&tmp.path().join("other.txt"), 999);

    let target = Target::new(
        "thumbcache",
        "Thumbnails",
        SafetyClass::Safe,
        Method::PatternMatch {
            path: tmp.path().to_path_buf(),
            pattern: FilePattern::new("thumbcache*.db").unwrap(),
        },
        "",
    );
    let engine = engine(vec![target], ScriptedShell::default());

    let (_, scanned) = scan(&engine);
    assert_eq!(scanned.items[0].size_bytes, 50);

    let (_, cleaned) = clean(&engine, &["thumbcache"]);
    assert_eq!(cleaned.details[0].reclaimed_bytes, 50);
    assert!(!tmp.path().join("thumbcache001.db").exists());
    assert!(tmp.path().join("other.txt").exists());
}

#[test]
fn unknown_id_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    write(&cache.join("a.bin"), 10);

    let engine = engine(vec![dir_target("cache", &cache)], ScriptedShell::default());

    let (events, cleaned) = clean(&engine, &["does-not-exist"]);

    assert!(!cleaned.aborted);
    assert!(cleaned.details.is_empty());
    assert_eq!(cleaned.freed_bytes, 0);
    assert_eq!(events.len(), 1);
    assert!(cache.join("a.bin").exists());
}

#[test]
fn missing_locations_scan_as_zero() {
    let tmp = TempDir::new().unwrap();
    let targets = vec![
        dir_target("gone", &tmp.path().join("gone")),
        Target::new(
            "profiles",
            "Profiles",
            SafetyClass::Safe,
            Method::MultiProfileCache {
                path: tmp.path().join("Profiles"),
            },
            "",
        ),
        Target::new(
            "thumbs",
            "Thumbs",
            SafetyClass::Safe,
            Method::PatternMatch {
                path: tmp.path().join("Explorer"),
                pattern: FilePattern::new("*.db").unwrap(),
            },
            "",
        ),
        Target::new("bin", "Bin", SafetyClass::Safe, Method::SystemTrash, ""),
    ];
    let engine = engine(targets, ScriptedShell::default());

    let (_, scanned) = scan(&engine);

    assert!(!scanned.aborted);
    assert_eq!(scanned.items.len(), 4);
    assert!(scanned.items.iter().all(|i| i.size_bytes == 0));
}

#[test]
fn trash_growing_during_clean_reclaims_zero() {
    let bin = Target::new("bin", "Bin", SafetyClass::Safe, Method::SystemTrash, "");
    let engine = engine(vec![bin], ScriptedShell::new(&["100", "500"], &["OK"]));

    let (_, cleaned) = clean(&engine, &["bin"]);

    assert!(cleaned.details[0].succeeded);
    assert_eq!(cleaned.details[0].reclaimed_bytes, 0);
    assert_eq!(cleaned.freed_bytes, 0);
}

#[test]
fn trash_empty_failure_is_reported() {
    let bin = Target::new("bin", "Bin", SafetyClass::Safe, Method::SystemTrash, "");
    let engine = engine(vec![bin], ScriptedShell::new(&["2048", "2048"], &["ERR"]));

    let (_, cleaned) = clean(&engine, &["bin"]);

    assert!(!cleaned.aborted);
    assert!(!cleaned.details[0].succeeded);
    assert!(cleaned.details[0].error.is_some());
}

#[test]
fn scan_progress_is_monotonic_and_ends_at_100() {
    let tmp = TempDir::new().unwrap();
    let targets: Vec<Target> = (0..7)
        .map(|i| {
            let dir = tmp.path().join(format!("c{}", i));
            write(&dir.join("f"), 10);
            dir_target(&format!("c{}", i), &dir)
        })
        .collect();
    let engine = engine(targets, ScriptedShell::default());

    let (events, _) = scan(&engine);
    let percents = progress_percents(&events);

    assert_eq!(percents.len(), 7);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(percents.last(), Some(&100));
    assert!(events.last().unwrap().is_completion());
}

#[test]
fn clean_progress_uses_selection_position() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    write(&a.join("f"), 10);
    write(&b.join("f"), 10);
    let engine = engine(
        vec![dir_target("a", &a), dir_target("b", &b)],
        ScriptedShell::default(),
    );

    let (events, _) = clean(&engine, &["a", "unknown", "b", "missing"]);

    assert_eq!(progress_percents(&events), vec![25, 75]);
}

#[test]
fn cancel_before_start_aborts_scan() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    write(&cache.join("a.bin"), 10);
    let engine = engine(vec![dir_target("cache", &cache)], ScriptedShell::default());

    let token = CancellationToken::new();
    token.cancel();
    let mut events = Vec::new();
    let complete = engine.run_scan(&token, |e| events.push(e));

    assert!(complete.aborted);
    assert!(complete.items.is_empty());
    assert_eq!(events.len(), 1);
}

#[test]
fn cancel_after_first_target_aborts_scan() {
    let tmp = TempDir::new().unwrap();
    let targets: Vec<Target> = (0..3)
        .map(|i| {
            let dir = tmp.path().join(format!("c{}", i));
            write(&dir.join("f"), 10);
            dir_target(&format!("c{}", i), &dir)
        })
        .collect();
    let engine = engine(targets, ScriptedShell::default());

    let token = engine.begin_scan();
    let mut events = Vec::new();
    let complete = engine.run_scan(&token, |e| {
        if matches!(e, EngineEvent::ScanProgress(_)) {
            engine.cancel_scan();
        }
        events.push(e);
    });

    assert!(complete.aborted);
    assert!(complete.items.is_empty());
    assert_eq!(progress_percents(&events), vec![33]);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::ScanComplete(ScanComplete {
            aborted: true,
            items: vec![],
        }))
    );
}

#[test]
fn cancel_mid_clean_leaves_later_targets() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    write(&a.join("f"), 10);
    write(&b.join("f"), 10);
    let engine = engine(
        vec![dir_target("a", &a), dir_target("b", &b)],
        ScriptedShell::default(),
    );

    let ids = vec!["a".to_string(), "b".to_string()];
    let token = engine.begin_clean();
    let complete = engine.run_clean(&ids, &token, |_| engine.cancel_clean());

    assert!(complete.aborted);
    assert_eq!(complete.freed_bytes, 0);
    assert!(complete.details.is_empty());
    assert!(!a.join("f").exists());
    assert!(b.join("f").exists());
}

#[cfg(unix)]
#[test]
fn symlinks_are_neither_sized_nor_deleted() {
    let tmp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    write(&outside.path().join("keep.bin"), 5000);
    let cache = tmp.path().join("cache");
    write(&cache.join("junk.bin"), 10);
    std::os::unix::fs::symlink(outside.path(), cache.join("link")).unwrap();

    let engine = engine(vec![dir_target("cache", &cache)], ScriptedShell::default());

    let (_, scanned) = scan(&engine);
    assert_eq!(scanned.items[0].size_bytes, 10);

    let (_, cleaned) = clean(&engine, &["cache"]);
    assert_eq!(cleaned.freed_bytes, 10);
    assert!(outside.path().join("keep.bin").exists());
    assert!(cache.join("link").symlink_metadata().is_ok());
}

#[test]
fn threaded_scan_streams_progress_then_completion() {
    let tmp = TempDir::new().unwrap();
    let targets: Vec<Target> = (0..3)
        .map(|i| {
            let dir = tmp.path().join(format!("c{}", i));
            write(&dir.join("f"), 10 * (i + 1));
            dir_target(&format!("c{}", i), &dir)
        })
        .collect();
    let engine = engine(targets, ScriptedShell::default());

    let (tx, rx) = mpsc::channel();
    engine.start_scan(tx).join().unwrap();
    let events: Vec<EngineEvent> = rx.iter().collect();

    assert_eq!(events.len(), 4);
    assert_eq!(events.iter().filter(|e| e.is_completion()).count(), 1);
    match events.last().unwrap() {
        EngineEvent::ScanComplete(complete) => {
            let sizes: Vec<u64> = complete.items.iter().map(|i| i.size_bytes).collect();
            assert_eq!(sizes, vec![10, 20, 30]);
        }
        other => panic!("Expected scan completion, got {:?}", other),
    }
}

#[test]
fn threaded_clean_streams_completion() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    write(&cache.join("a.bin"), 64);
    let engine = engine(vec![dir_target("cache", &cache)], ScriptedShell::default());

    let (tx, rx) = mpsc::channel();
    engine
        .start_clean(vec!["cache".to_string()], tx)
        .join()
        .unwrap();
    let events: Vec<EngineEvent> = rx.iter().collect();

    assert_eq!(events.len(), 2);
    assert!(matches!(
        events.last(),
        Some(EngineEvent::CleanComplete(c)) if !c.aborted && c.freed_bytes == 64
    ));
}
