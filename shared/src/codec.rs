//! Wire encodings for protocol events.
//!
//! Clients pick an encoding when they connect: JSON text frames by default,
//! or compact `bincode` binary frames. Both carry the same event types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Request path that selects binary framing during the handshake.
pub const BINARY_PATH: &str = "/bin";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary codec error: {0}")]
    Binary(#[from] bincode::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Json,
    Binary,
}

/// An encoded payload, ready to be wrapped in a transport frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Encoding {
    pub fn for_path(path: &str) -> Self {
        if path == BINARY_PATH {
            Encoding::Binary
        } else {
            Encoding::Json
        }
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Frame, CodecError> {
        match self {
            Encoding::Json => Ok(Frame::Text(serde_json::to_string(value)?)),
            Encoding::Binary => Ok(Frame::Binary(bincode::serialize(value)?)),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        match self {
            Encoding::Json => Ok(serde_json::from_slice(bytes)?),
            Encoding::Binary => Ok(bincode::deserialize(bytes)?),
        }
    }
}
