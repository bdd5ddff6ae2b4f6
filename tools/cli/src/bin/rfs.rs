// CLASSIFICATION: COMMUNITY
// Filename: tools/cli/src/bin/rfs.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-09-02

//! Single-shot client for the rfs file service.
//!
//! Connects, sends exactly one request record, reads exactly one response
//! record, prints the outcome, and exits 0 whether or not the server
//! reported success; only transport and usage failures exit nonzero.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use rfs_wire::{Operation, Request, Response, Status, DEFAULT_PORT, RESPONSE_RECORD_LEN};

/// Timeout applied to connect, read, and write on the client socket.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "rfs", about = "Issue a single operation against an rfs server")]
struct Args {
    /// Server address, host or host:port
    server: String,
    /// Operation to perform
    operation: OperationArg,
    /// Path relative to the server root (required but ignored for list)
    path: String,
    /// Payload text for write
    data: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OperationArg {
    Read,
    Write,
    Create,
    Delete,
    List,
}

impl From<OperationArg> for Operation {
    fn from(value: OperationArg) -> Self {
        match value {
            OperationArg::Read => Operation::Read,
            OperationArg::Write => Operation::Write,
            OperationArg::Create => Operation::Create,
            OperationArg::Delete => Operation::Delete,
            OperationArg::List => Operation::List,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let payload = match args.operation {
        OperationArg::Write => args.data.clone().unwrap_or_default().into_bytes(),
        _ => Vec::new(),
    };
    let request = Request::new(args.operation.into(), &args.path, payload)
        .context("request exceeds protocol limits")?;
    let response = exchange(&args.server, &request)?;
    match response.status {
        Status::Ok if !response.payload.is_empty() => {
            println!("{}", String::from_utf8_lossy(&response.payload));
        }
        Status::Ok => println!("Success"),
        status => println!("Error: status {}", status.code()),
    }
    Ok(())
}

/// Append the default port unless the address already carries one.
///
/// A bare IPv6 literal such as `::1` is full of colons but carries no
/// port; it gets bracketed so the port stays unambiguous.
fn target_with_port(server: &str) -> String {
    if server.starts_with('[') {
        if server.contains("]:") {
            return server.to_owned();
        }
        return format!("{server}:{DEFAULT_PORT}");
    }
    match server.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => {
            server.to_owned()
        }
        _ if server.contains(':') => format!("[{server}]:{DEFAULT_PORT}"),
        _ => format!("{server}:{DEFAULT_PORT}"),
    }
}

/// One connection, one request record out, one response record back.
fn exchange(server: &str, request: &Request) -> Result<Response> {
    let target = target_with_port(server);
    let addr = target
        .to_socket_addrs()
        .context("invalid server address")?
        .next()
        .ok_or_else(|| anyhow!("no addresses resolved for {target}"))?;
    let mut stream =
        TcpStream::connect_timeout(&addr, DEFAULT_TIMEOUT).context("failed to connect")?;
    stream
        .set_read_timeout(Some(DEFAULT_TIMEOUT))
        .context("failed to configure read timeout")?;
    stream
        .set_write_timeout(Some(DEFAULT_TIMEOUT))
        .context("failed to configure write timeout")?;

    let record = request.encode().context("failed to encode request")?;
    stream
        .write_all(&record)
        .context("failed to send request record")?;

    let mut record = vec![0u8; RESPONSE_RECORD_LEN];
    stream
        .read_exact(&mut record)
        .context("connection closed before a full response record")?;
    Response::decode(&record).context("malformed response record")
}
