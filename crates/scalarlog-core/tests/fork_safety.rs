//! A logger created before `fork()` must keep working in the child.

#![cfg(unix)]

use std::path::Path;

use scalarlog_core::{find_event_files, read_events, Logger};
use tempfile::TempDir;

/// Run `body` in a forked child and return its exit code.
fn run_in_child(body: impl FnOnce() -> i32) -> i32 {
    // SAFETY: the child only runs `body` and then `_exit`s without returning
    // into the test harness.
    let pid = unsafe { libc::fork() };
    assert!(pid >= 0, "fork failed");
    if pid == 0 {
        let code = body();
        // SAFETY: terminate the child immediately, skipping atexit handlers
        // that belong to the parent.
        unsafe { libc::_exit(code) };
    }

    let mut status = 0;
    // SAFETY: `pid` is our own child and `status` is a valid out pointer.
    let waited = unsafe { libc::waitpid(pid, &mut status, 0) };
    assert_eq!(waited, pid, "waitpid failed");
    #[allow(unused_unsafe)]
    // SAFETY: pure bit inspection of the status word.
    let (exited, code) = unsafe { (libc::WIFEXITED(status), libc::WEXITSTATUS(status)) };
    assert!(exited, "child did not exit normally");
    code
}

fn tags_and_steps(dir: &Path) -> Vec<(String, i64)> {
    let files = find_event_files(dir).unwrap();
    assert_eq!(files.len(), 1);
    read_events(&files[0])
        .unwrap()
        .iter()
        .flat_map(|e| e.scalars().map(move |(t, _)| (t.to_string(), e.step)))
        .collect()
}

#[test]
fn test_fork_safety() {
    // inherited logger, same file
    let tmp = TempDir::new().unwrap();
    let mut logger = Logger::open(tmp.path()).unwrap();
    logger.log("parent", 1.0, None).unwrap();

    let code = run_in_child(|| match logger.log("child", 2.0, None) {
        Ok(()) => 0,
        Err(_) => 1,
    });
    assert_eq!(code, 0, "child failed to log");

    logger.log("parent", 3.0, None).unwrap();
    logger.close().unwrap();
    assert_eq!(
        tags_and_steps(tmp.path()),
        vec![
            ("parent".to_string(), 0),
            ("child".to_string(), 0),
            ("parent".to_string(), 1),
        ]
    );

    // child opens its own logger in a different directory
    let parent_dir = tmp.path().join("parent");
    let child_dir = tmp.path().join("child");
    let mut parent = Logger::open(&parent_dir).unwrap();
    parent.log("p", 0.0, None).unwrap();

    let code = run_in_child(|| {
        let result = Logger::open(&child_dir).and_then(|mut child| {
            for i in 0..5 {
                child.log("c", i as f64, None)?;
            }
            child.close()
        });
        i32::from(result.is_err())
    });
    assert_eq!(code, 0, "child failed to write its own directory");

    for i in 1..5 {
        parent.log("p", i as f64, None).unwrap();
    }
    parent.close().unwrap();

    let parent_records = tags_and_steps(&parent_dir);
    let child_records = tags_and_steps(&child_dir);
    assert_eq!(parent_records.len(), 5);
    assert!(parent_records.iter().all(|(t, _)| t == "p"));
    assert_eq!(
        child_records,
        (0..5).map(|i| ("c".to_string(), i)).collect::<Vec<_>>()
    );
}
