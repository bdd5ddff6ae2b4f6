// CLASSIFICATION: COMMUNITY
// Filename: src/config.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-09-02

//! Runtime configuration for the file service daemon.

use std::path::PathBuf;

use rfs_wire::DEFAULT_PORT;

/// Default number of distinct paths the lock table tracks before it starts
/// handing out unsynchronised access.
pub const DEFAULT_MAX_LOCKS: usize = 64;

/// Configuration options for the file service daemon.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root directory the server exposes. Every request path is joined
    /// onto this prefix.
    pub root: PathBuf,
    /// TCP port to listen on. Port 0 picks an ephemeral port.
    pub port: u16,
    /// Capacity of the per-path lock table.
    pub max_locks: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("server_files"),
            port: DEFAULT_PORT,
            max_locks: DEFAULT_MAX_LOCKS,
        }
    }
}
