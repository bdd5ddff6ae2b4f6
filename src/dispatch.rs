// CLASSIFICATION: COMMUNITY
// Filename: src/dispatch.rs v0.5
// Author: Lukas Bower
// Date Modified: 2027-09-02

//! Maps one decoded request to one response.
//!
//! The dispatcher resolves the request path against the served root, takes
//! the path's lock for the duration of the filesystem call, and converts
//! every filesystem failure into a wire status. Nothing propagates past
//! `handle` as an unhandled fault.
//!
//! Path resolution is a plain join onto the root directory; `..` segments
//! are neither rejected nor canonicalised. The server trusts its clients
//! to the same degree the root directory's permissions do.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use rfs_wire::{Operation, Request, Response, Status, MAX_DATA_LEN};

use crate::lock_table::PathLockTable;

/// Turns decoded requests into responses by performing exactly one
/// filesystem operation each, serialised per path by the injected lock
/// table.
pub struct Dispatcher {
    root: PathBuf,
    locks: Arc<PathLockTable>,
}

impl Dispatcher {
    /// Create a dispatcher serving `root`, synchronised through `locks`.
    pub fn new(root: impl Into<PathBuf>, locks: Arc<PathLockTable>) -> Self {
        Self {
            root: root.into(),
            locks,
        }
    }

    /// Handle one request. Infallible by contract: every failure becomes
    /// a status code in the response.
    pub fn handle(&self, request: &Request) -> Response {
        match request.operation {
            Operation::List => self.list(),
            Operation::Unknown(code) => {
                warn!("unknown operation code {code}");
                Response::empty(Status::Error)
            }
            operation => {
                let resolved = self.root.join(&request.path);
                let handle = self.locks.acquire_for(&resolved.to_string_lossy());
                // None means the table is full: proceed unsynchronised.
                let _guard = handle.as_ref().map(|handle| match handle.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                });
                match operation {
                    Operation::Read => self.read(&resolved),
                    Operation::Write => self.write(&resolved, &request.payload),
                    Operation::Create => self.create(&resolved),
                    Operation::Delete => self.delete(&resolved),
                    Operation::List | Operation::Unknown(_) => unreachable!(),
                }
            }
        }
    }

    fn read(&self, resolved: &Path) -> Response {
        let file = match File::open(resolved) {
            Ok(file) => file,
            Err(err) => {
                warn!("read {}: {err}", resolved.display());
                return Response::empty(status_for(&err, Status::NotFound));
            }
        };
        let mut payload = Vec::new();
        // Files larger than the record buffer are truncated, not refused.
        match file.take(MAX_DATA_LEN as u64).read_to_end(&mut payload) {
            Ok(count) => {
                info!("read {} ({count} bytes)", resolved.display());
                Response {
                    status: Status::Ok,
                    payload,
                }
            }
            Err(err) => {
                warn!("read {}: {err}", resolved.display());
                Response::empty(status_for(&err, Status::Error))
            }
        }
    }

    fn write(&self, resolved: &Path, payload: &[u8]) -> Response {
        let mut file = match File::create(resolved) {
            Ok(file) => file,
            Err(err) => {
                warn!("write {}: {err}", resolved.display());
                return Response::empty(status_for(&err, Status::Error));
            }
        };
        match file.write_all(payload) {
            Ok(()) => {
                info!("write {} ({} bytes)", resolved.display(), payload.len());
                Response::empty(Status::Ok)
            }
            Err(err) => {
                warn!("write {}: {err}", resolved.display());
                Response::empty(status_for(&err, Status::Error))
            }
        }
    }

    fn create(&self, resolved: &Path) -> Response {
        match File::open(resolved) {
            Ok(_) => {
                info!("create {}: already exists", resolved.display());
                return Response::empty(Status::AlreadyExists);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!("create {}: {err}", resolved.display());
                return Response::empty(status_for(&err, Status::Error));
            }
        }
        match File::create(resolved) {
            Ok(_) => {
                info!("create {}", resolved.display());
                Response::empty(Status::Ok)
            }
            Err(err) => {
                warn!("create {}: {err}", resolved.display());
                Response::empty(status_for(&err, Status::Error))
            }
        }
    }

    fn delete(&self, resolved: &Path) -> Response {
        match fs::remove_file(resolved) {
            Ok(()) => {
                info!("delete {}", resolved.display());
                Response::empty(Status::Ok)
            }
            Err(err) => {
                warn!("delete {}: {err}", resolved.display());
                Response::empty(status_for(&err, Status::NotFound))
            }
        }
    }

    // List walks the whole root rather than a single path, so it takes no
    // path lock; concurrent creates and deletes may or may not appear.
    fn list(&self) -> Response {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("list {}: {err}", self.root.display());
                let message = format!("cannot open {}: {err}", self.root.display());
                let mut payload = message.into_bytes();
                payload.truncate(MAX_DATA_LEN);
                return Response {
                    status: status_for(&err, Status::Error),
                    payload,
                };
            }
        };
        let mut payload = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("list {}: {err}", self.root.display());
                    continue;
                }
            };
            let name = entry.file_name();
            let name = name.to_string_lossy();
            // Stop at the last entry that fits rather than overflowing
            // the fixed response buffer.
            if payload.len() + name.len() + 1 > MAX_DATA_LEN {
                warn!(
                    "list {}: output truncated at {} bytes",
                    self.root.display(),
                    payload.len()
                );
                break;
            }
            payload.extend_from_slice(name.as_bytes());
            payload.push(b'\n');
        }
        info!("list {} ({} bytes)", self.root.display(), payload.len());
        Response {
            status: Status::Ok,
            payload,
        }
    }
}

/// Map an I/O error to its wire status, routing genuine permission
/// failures to `PermissionDenied` instead of the operation's fallback.
fn status_for(err: &io::Error, fallback: Status) -> Status {
    if err.kind() == io::ErrorKind::PermissionDenied {
        Status::PermissionDenied
    } else {
        fallback
    }
}
