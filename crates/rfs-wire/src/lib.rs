// CLASSIFICATION: COMMUNITY
// Filename: crates/rfs-wire/src/lib.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-09-02

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Fixed-record wire types shared by the rfs server and client.
//!
//! Every message on the wire is a single fixed-length record: one request
//! record from client to server, one response record back, then the
//! connection closes. Variable-length fields live inside fixed buffers with
//! the unused remainder as zero padding, so a record's encoded size never
//! depends on its logical payload length. This caps the transferable payload
//! at [`MAX_DATA_LEN`] bytes per operation; larger files are truncated on
//! read and unsupported on write. A documented limitation, not a bug.

use std::fmt;

/// Size of the fixed path buffer inside a request record, including the
/// terminating NUL. Paths may be at most `MAX_PATH_LEN - 1` bytes.
pub const MAX_PATH_LEN: usize = 256;

/// Size of the fixed payload buffer in both record types.
pub const MAX_DATA_LEN: usize = 4096;

/// Well-known TCP port the server listens on by default.
pub const DEFAULT_PORT: u16 = 9999;

/// Encoded size of a request record: operation, payload length, path
/// buffer, payload buffer.
pub const REQUEST_RECORD_LEN: usize = 4 + 4 + MAX_PATH_LEN + MAX_DATA_LEN;

/// Encoded size of a response record: status, payload length, payload
/// buffer.
pub const RESPONSE_RECORD_LEN: usize = 4 + 4 + MAX_DATA_LEN;

/// Possible errors produced while encoding or decoding wire records.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    /// Input buffer was shorter than the fixed record size.
    #[error("truncated record: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Fixed record size required by the decoder.
        expected: usize,
        /// Byte length actually supplied.
        actual: usize,
    },
    /// Declared payload length exceeds the fixed buffer capacity.
    #[error("declared payload length {declared} exceeds capacity {capacity}")]
    PayloadOverflow {
        /// Payload length declared in the record header.
        declared: u32,
        /// Fixed payload buffer capacity.
        capacity: usize,
    },
    /// Path field filled the entire buffer without a NUL terminator.
    #[error("path exceeds {limit} bytes", limit = MAX_PATH_LEN - 1)]
    PathTooLong,
    /// Path bytes were not valid UTF-8.
    #[error("invalid utf8 in path field")]
    InvalidUtf8,
    /// Path contains a NUL byte, which the NUL-padded buffer cannot carry.
    #[error("NUL byte in path field")]
    InvalidPath,
    /// Encountered a status code outside the defined taxonomy.
    #[error("unsupported status code {0}")]
    UnsupportedStatus(u32),
}

/// Operation requested by a client.
///
/// Codes outside the defined range decode to [`Operation::Unknown`] so the
/// server can answer with an error status instead of dropping the
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Read a file's contents, truncated to [`MAX_DATA_LEN`].
    Read,
    /// Replace a file's contents with the request payload.
    Write,
    /// Create an empty file if none exists.
    Create,
    /// Remove a file.
    Delete,
    /// Enumerate the served root directory.
    List,
    /// Operation code not recognised by this build.
    Unknown(u32),
}

impl Operation {
    /// Wire code for this operation.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Read => 1,
            Self::Write => 2,
            Self::Create => 3,
            Self::Delete => 4,
            Self::List => 5,
            Self::Unknown(code) => code,
        }
    }

    /// Map a wire code to an operation, preserving unrecognised codes.
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Read,
            2 => Self::Write,
            3 => Self::Create,
            4 => Self::Delete,
            5 => Self::List,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
            Self::List => write!(f, "list"),
            Self::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

/// Outcome of one dispatched operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Operation succeeded.
    Ok,
    /// Generic filesystem or protocol failure.
    Error,
    /// Target file was absent.
    NotFound,
    /// Filesystem refused access to the target.
    PermissionDenied,
    /// Create was asked to make a file that already exists.
    AlreadyExists,
}

impl Status {
    /// Wire code for this status.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Ok => 0,
            Self::Error => 1,
            Self::NotFound => 2,
            Self::PermissionDenied => 3,
            Self::AlreadyExists => 4,
        }
    }

    fn from_code(code: u32) -> Result<Self, WireError> {
        Ok(match code {
            0 => Self::Ok,
            1 => Self::Error,
            2 => Self::NotFound,
            3 => Self::PermissionDenied,
            4 => Self::AlreadyExists,
            other => return Err(WireError::UnsupportedStatus(other)),
        })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ok => "Ok",
            Self::Error => "Error",
            Self::NotFound => "NotFound",
            Self::PermissionDenied => "PermissionDenied",
            Self::AlreadyExists => "AlreadyExists",
        };
        write!(f, "{label}")
    }
}

/// One client request: an operation, a target path, and an optional
/// payload consumed by `Write`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Operation to perform.
    pub operation: Operation,
    /// Path relative to the served root. Ignored by `List`.
    pub path: String,
    /// Payload bytes; meaningful for `Write`, empty otherwise.
    pub payload: Vec<u8>,
}

impl Request {
    /// Build a request, validating the path and payload bounds.
    pub fn new(
        operation: Operation,
        path: impl Into<String>,
        payload: Vec<u8>,
    ) -> Result<Self, WireError> {
        let path = path.into();
        validate_path(&path)?;
        if payload.len() > MAX_DATA_LEN {
            return Err(WireError::PayloadOverflow {
                declared: payload.len() as u32,
                capacity: MAX_DATA_LEN,
            });
        }
        Ok(Self {
            operation,
            path,
            payload,
        })
    }

    /// Encode into the fixed request record.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        validate_path(&self.path)?;
        if self.payload.len() > MAX_DATA_LEN {
            return Err(WireError::PayloadOverflow {
                declared: self.payload.len() as u32,
                capacity: MAX_DATA_LEN,
            });
        }
        let mut record = vec![0u8; REQUEST_RECORD_LEN];
        record[0..4].copy_from_slice(&self.operation.code().to_le_bytes());
        record[4..8].copy_from_slice(&(self.payload.len() as u32).to_le_bytes());
        record[8..8 + self.path.len()].copy_from_slice(self.path.as_bytes());
        let payload_at = 8 + MAX_PATH_LEN;
        record[payload_at..payload_at + self.payload.len()].copy_from_slice(&self.payload);
        Ok(record)
    }

    /// Decode a fixed request record.
    pub fn decode(record: &[u8]) -> Result<Self, WireError> {
        if record.len() < REQUEST_RECORD_LEN {
            return Err(WireError::Truncated {
                expected: REQUEST_RECORD_LEN,
                actual: record.len(),
            });
        }
        let operation = Operation::from_code(read_u32(record, 0));
        let payload_len = read_u32(record, 4);
        if payload_len as usize > MAX_DATA_LEN {
            return Err(WireError::PayloadOverflow {
                declared: payload_len,
                capacity: MAX_DATA_LEN,
            });
        }
        let path_buf = &record[8..8 + MAX_PATH_LEN];
        let nul = path_buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(WireError::PathTooLong)?;
        let path = std::str::from_utf8(&path_buf[..nul])
            .map_err(|_| WireError::InvalidUtf8)?
            .to_owned();
        let payload_at = 8 + MAX_PATH_LEN;
        let payload = record[payload_at..payload_at + payload_len as usize].to_vec();
        Ok(Self {
            operation,
            path,
            payload,
        })
    }
}

/// One server response: a status and an optional payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Outcome of the dispatched operation.
    pub status: Status,
    /// Payload bytes; file contents for `Read`, listing for `List`,
    /// diagnostics on some failures, empty otherwise.
    pub payload: Vec<u8>,
}

impl Response {
    /// Build an `Ok` response carrying the given payload.
    pub fn ok(payload: Vec<u8>) -> Result<Self, WireError> {
        if payload.len() > MAX_DATA_LEN {
            return Err(WireError::PayloadOverflow {
                declared: payload.len() as u32,
                capacity: MAX_DATA_LEN,
            });
        }
        Ok(Self {
            status: Status::Ok,
            payload,
        })
    }

    /// Build a payload-free response with the given status.
    #[must_use]
    pub fn empty(status: Status) -> Self {
        Self {
            status,
            payload: Vec::new(),
        }
    }

    /// Encode into the fixed response record.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        if self.payload.len() > MAX_DATA_LEN {
            return Err(WireError::PayloadOverflow {
                declared: self.payload.len() as u32,
                capacity: MAX_DATA_LEN,
            });
        }
        let mut record = vec![0u8; RESPONSE_RECORD_LEN];
        record[0..4].copy_from_slice(&self.status.code().to_le_bytes());
        record[4..8].copy_from_slice(&(self.payload.len() as u32).to_le_bytes());
        record[8..8 + self.payload.len()].copy_from_slice(&self.payload);
        Ok(record)
    }

    /// Decode a fixed response record.
    pub fn decode(record: &[u8]) -> Result<Self, WireError> {
        if record.len() < RESPONSE_RECORD_LEN {
            return Err(WireError::Truncated {
                expected: RESPONSE_RECORD_LEN,
                actual: record.len(),
            });
        }
        let status = Status::from_code(read_u32(record, 0))?;
        let payload_len = read_u32(record, 4);
        if payload_len as usize > MAX_DATA_LEN {
            return Err(WireError::PayloadOverflow {
                declared: payload_len,
                capacity: MAX_DATA_LEN,
            });
        }
        let payload = record[8..8 + payload_len as usize].to_vec();
        Ok(Self { status, payload })
    }
}

// A path with an interior NUL would decode as its prefix, so encoding one
// can never round-trip; reject it up front.
fn validate_path(path: &str) -> Result<(), WireError> {
    if path.len() >= MAX_PATH_LEN {
        return Err(WireError::PathTooLong);
    }
    if path.as_bytes().contains(&0) {
        return Err(WireError::InvalidPath);
    }
    Ok(())
}

fn read_u32(record: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&record[at..at + 4]);
    u32::from_le_bytes(buf)
}
