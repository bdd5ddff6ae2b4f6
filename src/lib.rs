// CLASSIFICATION: COMMUNITY
// Filename: src/lib.rs v0.4
// Author: Lukas Bower
// Date Modified: 2027-09-02

//! Remote file service daemon.
//!
//! Serves a single directory over TCP using the fixed-record protocol from
//! [`rfs_wire`]. Each accepted connection carries exactly one request and
//! one response; conflicting operations on the same file are serialised by
//! a per-path lock table while operations on distinct files run in
//! parallel.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dispatch;
pub mod lock_table;
pub mod server;

pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use lock_table::PathLockTable;
pub use server::Server;
