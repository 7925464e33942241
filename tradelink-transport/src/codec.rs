/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tokio codec for venue frame boundaries.
//!
//! Each frame on the wire is a `u32` big-endian length prefix followed by
//! that many payload bytes. Read and write boundaries are message
//! boundaries, never arbitrary byte chunks.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Length prefix size in bytes.
const PREFIX_LEN: usize = 4;

/// Errors that can occur during codec operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Frame exceeds maximum size.
    #[error("frame too large: {size} bytes exceeds maximum {max_size}")]
    FrameTooLarge {
        /// Actual frame size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Tokio codec for length-delimited venue frames.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    /// Maximum frame payload size in bytes.
    max_frame_size: usize,
}

impl FrameCodec {
    /// Default maximum frame payload size (1 MiB).
    pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

    /// Creates a new codec with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_frame_size: Self::DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Sets the maximum frame payload size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < PREFIX_LEN {
            return Ok(None);
        }

        let length = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if length > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size: length,
                max_size: self.max_frame_size,
            });
        }

        let total = PREFIX_LEN + length;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(PREFIX_LEN);
        Ok(Some(src.split_to(length)))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size: item.len(),
                max_size: self.max_frame_size,
            });
        }
        dst.reserve(PREFIX_LEN + item.len());
        dst.put_u32(item.len() as u32);
        dst.put_slice(&item);
        Ok(())
    }
}

impl Encoder<&[u8]> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size: item.len(),
                max_size: self.max_frame_size,
            });
        }
        dst.reserve(PREFIX_LEN + item.len());
        dst.put_u32(item.len() as u32);
        dst.put_slice(item);
        Ok(())
    }
}
