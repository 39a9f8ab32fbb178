//! Response definitions
//!
//! Represents responses to clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ListError, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    EmptyList = 0x02,
    IndexOutOfRange = 0x03,
    Error = 0x04,
}

impl Status {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotFound),
            0x02 => Some(Status::EmptyList),
            0x03 => Some(Status::IndexOutOfRange),
            0x04 => Some(Status::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendReply {
    pub success: bool,
}

/// Reply to Remove and Get
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueReply {
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeReply {
    pub size: i64,
}

/// Successful outcome of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Append(AppendReply),
    Value(ValueReply),
    Size(SizeReply),
    Pong,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Encoded reply for OK, message for ERROR, empty otherwise
    pub payload: Vec<u8>,
}

impl Response {
    /// Create an OK response carrying `reply`
    pub fn ok(reply: &Reply) -> Result<Self> {
        let payload = match reply {
            Reply::Append(r) => bincode::serialize(r)?,
            Reply::Value(r) => bincode::serialize(r)?,
            Reply::Size(r) => bincode::serialize(r)?,
            Reply::Pong => Vec::new(),
        };
        Ok(Self {
            status: Status::Ok,
            payload,
        })
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: message.as_bytes().to_vec(),
        }
    }

    /// Map a failed request onto a status
    pub fn from_error(error: &ListError) -> Self {
        let status = match error {
            ListError::NotFound => Status::NotFound,
            ListError::EmptyList => Status::EmptyList,
            ListError::IndexOutOfRange => Status::IndexOutOfRange,
            other => return Self::error(&other.to_string()),
        };
        Self {
            status,
            payload: Vec::new(),
        }
    }

    /// Build a response from the outcome of a request
    pub fn from_result(result: Result<Reply>) -> Self {
        match result.and_then(|reply| Self::ok(&reply)) {
            Ok(response) => response,
            Err(e) => Self::from_error(&e),
        }
    }

    /// Decode an OK payload, or turn an error status back into a `ListError`
    pub fn into_reply<T: DeserializeOwned>(self) -> Result<T> {
        match self.status {
            Status::Ok => Ok(bincode::deserialize(&self.payload)?),
            Status::NotFound => Err(ListError::NotFound),
            Status::EmptyList => Err(ListError::EmptyList),
            Status::IndexOutOfRange => Err(ListError::IndexOutOfRange),
            Status::Error => Err(ListError::Remote(
                String::from_utf8_lossy(&self.payload).into_owned(),
            )),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}
