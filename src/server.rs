// CLASSIFICATION: COMMUNITY
// Filename: src/server.rs v0.4
// Author: Lukas Bower
// Date Modified: 2027-09-02

//! TCP accept loop and per-connection request handling.
//!
//! One thread per accepted connection: the handler reads exactly one fixed
//! request record, dispatches it, writes exactly one response record, and
//! closes. A short or malformed read terminates the connection silently; a
//! partial fixed-size record cannot be decoded, so no error response is
//! attempted. Blocking I/O in one handler never stalls the accept loop or
//! other connections.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use rfs_wire::{Request, REQUEST_RECORD_LEN};

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::lock_table::PathLockTable;

/// Socket timeout applied to accepted connections so a dead peer cannot
/// pin a handler thread forever.
const CLIENT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// A bound file service listener, ready to accept connections.
pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    /// Bind the listening socket and assemble the dispatcher and lock
    /// table described by `config`.
    pub fn bind(config: &ServerConfig) -> Result<Self> {
        let locks = Arc::new(PathLockTable::new(config.max_locks));
        let dispatcher = Arc::new(Dispatcher::new(config.root.clone(), locks));
        let listener = TcpListener::bind(("0.0.0.0", config.port))
            .with_context(|| format!("failed to bind port {}", config.port))?;
        Ok(Self {
            listener,
            dispatcher,
        })
    }

    /// Address the listener is bound to. Useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("listener has no local address")
    }

    /// Accept connections until the process terminates, spawning one
    /// handler thread per connection.
    pub fn run(self) {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let dispatcher = self.dispatcher.clone();
                    thread::spawn(move || {
                        if let Err(err) = handle_client(stream, &dispatcher) {
                            info!("client session ended: {err:#}");
                        }
                    });
                }
                Err(err) => warn!("incoming connection failed: {err}"),
            }
        }
    }

    /// Run the accept loop on a background thread.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }
}

/// Serve one connection: one request record in, one response record out.
fn handle_client(mut stream: TcpStream, dispatcher: &Dispatcher) -> Result<()> {
    stream
        .set_read_timeout(Some(CLIENT_IO_TIMEOUT))
        .context("failed to configure read timeout")?;
    stream
        .set_write_timeout(Some(CLIENT_IO_TIMEOUT))
        .context("failed to configure write timeout")?;

    let mut record = vec![0u8; REQUEST_RECORD_LEN];
    stream
        .read_exact(&mut record)
        .context("short request record")?;
    let request = Request::decode(&record).context("malformed request record")?;

    let response = dispatcher.handle(&request);
    let encoded = response
        .encode()
        .context("failed to encode response record")?;
    stream
        .write_all(&encoded)
        .context("failed to write response record")?;
    Ok(())
}
