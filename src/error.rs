//! Typed errors for the core (§7 of the design: stream-control, encoder
//! argument, and passthrough memory errors are distinct kinds).

use thiserror::Error;

/// Errors raised by the text/tokenizer core.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Stream-control error: over-nested stream 3, an out-of-range stream 3
    /// target, or an unknown stream number. Carries the offending stream.
    #[error("invalid output stream control for stream {stream}: {reason}")]
    StreamControl { stream: i16, reason: &'static str },

    /// Encoder was asked for a target Z-character count that isn't zero
    /// (variable width) or a positive multiple of three.
    #[error("encoder target width {0} must be 0 or a positive multiple of 3")]
    EncoderArgument(usize),

    /// A memory collaborator error, propagated unchanged (§7.3).
    #[error("memory access error: {0}")]
    Memory(String),

    /// A malformed Z-word's bit fields couldn't be read (§7.3).
    #[error("text decode error: {0}")]
    TextDecode(#[from] bitreader::BitReaderError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
