//! Request definitions
//!
//! Represents calls from clients.

use serde::{Deserialize, Serialize};

/// Request kinds (first byte of a request frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestKind {
    Append = 0x01,
    Remove = 0x02,
    Get = 0x03,
    Size = 0x04,
    Ping = 0x05,
}

impl RequestKind {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(RequestKind::Append),
            0x02 => Some(RequestKind::Remove),
            0x03 => Some(RequestKind::Get),
            0x04 => Some(RequestKind::Size),
            0x05 => Some(RequestKind::Ping),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendArgs {
    pub list_id: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveArgs {
    pub list_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetArgs {
    pub list_id: String,
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeArgs {
    pub list_id: String,
}

/// A parsed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Push a value to the tail of a list
    Append(AppendArgs),

    /// Pop the tail of a list
    Remove(RemoveArgs),

    /// Read one value by index
    Get(GetArgs),

    /// Length of a list
    Size(SizeArgs),

    /// Ping (health check)
    Ping,
}

impl Request {
    pub fn append(list_id: impl Into<String>, value: i64) -> Self {
        Request::Append(AppendArgs {
            list_id: list_id.into(),
            value,
        })
    }

    pub fn remove(list_id: impl Into<String>) -> Self {
        Request::Remove(RemoveArgs {
            list_id: list_id.into(),
        })
    }

    pub fn get(list_id: impl Into<String>, index: i64) -> Self {
        Request::Get(GetArgs {
            list_id: list_id.into(),
            index,
        })
    }

    pub fn size(list_id: impl Into<String>) -> Self {
        Request::Size(SizeArgs {
            list_id: list_id.into(),
        })
    }

    /// Get the request kind
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Append(_) => RequestKind::Append,
            Request::Remove(_) => RequestKind::Remove,
            Request::Get(_) => RequestKind::Get,
            Request::Size(_) => RequestKind::Size,
            Request::Ping => RequestKind::Ping,
        }
    }
}
