//! Errors surfaced by a top-K request.
//!
//! Only two things can fail a request: a bad K, checked before the stream is
//! touched, and an I/O fault while reading it. Per-line problems are never
//! errors; they reach a [`crate::discard::DiscardSink`] instead.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopKError {
    #[error("k must be a positive integer, got {0}")]
    InvalidParameter(i64),

    #[error("failed to read input stream: {0}")]
    StreamRead(#[from] io::Error),
}

impl TopKError {
    /// True when the read was aborted by a shutdown request rather than a fault
    pub fn is_interrupted(&self) -> bool {
        matches!(self, TopKError::StreamRead(e) if e.kind() == io::ErrorKind::Interrupted)
    }
}

pub type Result<T, E = TopKError> = std::result::Result<T, E>;
