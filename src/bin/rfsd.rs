// CLASSIFICATION: COMMUNITY
// Filename: src/bin/rfsd.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-09-02

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rfsd::{Server, ServerConfig};

/// Serve a directory over the rfs fixed-record protocol.
#[derive(Parser)]
#[command(about = "Export a directory over the rfs protocol")]
struct Args {
    /// Directory to export; created if missing
    #[arg(long, default_value = "server_files")]
    root: PathBuf,
    /// TCP port to listen on
    #[arg(long, default_value_t = rfs_wire::DEFAULT_PORT)]
    port: u16,
    /// Distinct paths tracked by the lock table before degraded mode
    #[arg(long, default_value_t = rfsd::config::DEFAULT_MAX_LOCKS)]
    max_locks: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    std::fs::create_dir_all(&args.root)
        .with_context(|| format!("failed to create root {}", args.root.display()))?;
    let server = Server::bind(&ServerConfig {
        root: args.root,
        port: args.port,
        max_locks: args.max_locks,
    })?;
    info!("listening on {}", server.local_addr()?);
    server.run();
    Ok(())
}
