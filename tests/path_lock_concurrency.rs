// CLASSIFICATION: COMMUNITY
// Filename: tests/path_lock_concurrency.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-09-02

//! Concurrency properties of the dispatcher and lock table: same-path
//! mutual exclusion, cross-path parallelism, and graceful degradation
//! once the lock table fills up.

use std::fs;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rfs_wire::{Operation, Request, Status, MAX_DATA_LEN};
use rfsd::{Dispatcher, PathLockTable};
use tempfile::TempDir;

fn request(operation: Operation, path: &str, payload: Vec<u8>) -> Request {
    Request::new(operation, path, payload).expect("request in bounds")
}

#[test]
fn concurrent_writes_to_one_path_never_interleave() {
    let root = TempDir::new().expect("tempdir");
    let dispatcher = Arc::new(Dispatcher::new(
        root.path(),
        Arc::new(PathLockTable::new(8)),
    ));

    let payload_a = vec![b'A'; MAX_DATA_LEN];
    let payload_b = vec![b'B'; MAX_DATA_LEN];

    for _ in 0..20 {
        let mut handles = Vec::new();
        for payload in [payload_a.clone(), payload_b.clone()] {
            let dispatcher = dispatcher.clone();
            handles.push(thread::spawn(move || {
                let response =
                    dispatcher.handle(&request(Operation::Write, "contested.bin", payload));
                assert_eq!(response.status, Status::Ok);
            }));
        }
        for handle in handles {
            handle.join().expect("writer thread");
        }
        let contents = fs::read(root.path().join("contested.bin")).expect("file");
        assert!(
            contents == payload_a || contents == payload_b,
            "file holds an interleaving of both payloads"
        );
    }
}

#[test]
fn operations_on_distinct_paths_run_in_parallel() {
    let root = TempDir::new().expect("tempdir");
    let dispatcher = Arc::new(Dispatcher::new(
        root.path(),
        Arc::new(PathLockTable::new(256)),
    ));

    let mut handles = Vec::new();
    for i in 0..4 {
        let dispatcher = dispatcher.clone();
        handles.push(thread::spawn(move || {
            for j in 0..50 {
                let path = format!("file{i}_{j}");
                let written =
                    dispatcher.handle(&request(Operation::Write, &path, vec![b'x'; 64]));
                assert_eq!(written.status, Status::Ok);
                let read = dispatcher.handle(&request(Operation::Read, &path, Vec::new()));
                assert_eq!(read.status, Status::Ok);
                assert_eq!(read.payload, vec![b'x'; 64]);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("worker thread");
    }
}

#[test]
fn held_path_lock_blocks_only_its_own_path() {
    let root = TempDir::new().expect("tempdir");
    let locks = Arc::new(PathLockTable::new(8));
    let dispatcher = Arc::new(Dispatcher::new(root.path(), locks.clone()));

    // Hold path a's lock the way a long-running operation would, keyed
    // exactly as the dispatcher resolves it.
    let resolved_a = root.path().join("a").to_string_lossy().into_owned();
    let handle_a = locks.acquire_for(&resolved_a).expect("handle");
    let held = handle_a.lock().expect("hold a's lock");

    // A write to a different path must complete while a stays locked.
    let (tx, rx) = mpsc::channel();
    let worker = dispatcher.clone();
    thread::spawn(move || {
        let response = worker.handle(&request(Operation::Write, "b", vec![b'b'; 8]));
        tx.send(response.status).expect("report b");
    });
    let status = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("write to b stalled behind a's lock");
    assert_eq!(status, Status::Ok);

    // A write to the held path must wait for the lock.
    let (tx, rx) = mpsc::channel();
    let worker = dispatcher.clone();
    thread::spawn(move || {
        let response = worker.handle(&request(Operation::Write, "a", vec![b'a'; 8]));
        tx.send(response.status).expect("report a");
    });
    assert_eq!(
        rx.recv_timeout(Duration::from_millis(300)),
        Err(RecvTimeoutError::Timeout),
        "write to a completed while its lock was held"
    );

    drop(held);
    let status = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("write to a never resumed after release");
    assert_eq!(status, Status::Ok);
}

#[test]
fn lock_table_overflow_degrades_without_failing() {
    let root = TempDir::new().expect("tempdir");
    let locks = Arc::new(PathLockTable::new(2));
    let dispatcher = Arc::new(Dispatcher::new(root.path(), locks.clone()));

    // Fill the table, then keep issuing operations on fresh paths.
    for i in 0..10 {
        let path = format!("spill_{i}");
        let written = dispatcher.handle(&request(Operation::Write, &path, vec![b'y'; 16]));
        assert_eq!(written.status, Status::Ok);
        let read = dispatcher.handle(&request(Operation::Read, &path, Vec::new()));
        assert_eq!(read.status, Status::Ok);
        assert_eq!(read.payload, vec![b'y'; 16]);
    }
    // The table never grew past its bound.
    assert_eq!(locks.len(), 2);

    // Degraded paths still tolerate concurrent traffic without crashing.
    let mut handles = Vec::new();
    for i in 0..4 {
        let dispatcher = dispatcher.clone();
        handles.push(thread::spawn(move || {
            for j in 0..25 {
                let path = format!("degraded_{i}_{j}");
                let response =
                    dispatcher.handle(&request(Operation::Write, &path, vec![b'z'; 8]));
                assert_eq!(response.status, Status::Ok);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("worker thread");
    }
}
