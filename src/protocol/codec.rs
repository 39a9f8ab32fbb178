//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Kind (1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! Lengths are big-endian. Request payloads are bincode-encoded argument
//! structs.

use std::io::{Read, Write};

use crate::error::{ListError, Result};
use super::{Request, RequestKind, Response, Status};

/// Header size: 1 byte kind/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Framing
// =============================================================================

fn encode_frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(kind);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);
    message
}

fn check_payload_len(payload_len: usize) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(ListError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

/// Split a complete frame into its kind byte and payload
fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(ListError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let kind = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
    check_payload_len(payload_len)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(ListError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok((kind, &bytes[HEADER_SIZE..total_len]))
}

/// Read one complete frame from a stream
///
/// Blocks until the frame is received or an error occurs
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    check_payload_len(payload_len)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    let payload = match request {
        Request::Append(args) => bincode::serialize(args)?,
        Request::Remove(args) => bincode::serialize(args)?,
        Request::Get(args) => bincode::serialize(args)?,
        Request::Size(args) => bincode::serialize(args)?,
        Request::Ping => Vec::new(),
    };
    Ok(encode_frame(request.kind() as u8, &payload))
}

/// Decode a request from bytes
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let (kind_byte, payload) = split_frame(bytes)?;

    let kind = RequestKind::from_byte(kind_byte).ok_or_else(|| {
        ListError::Protocol(format!("Unknown request kind: 0x{:02x}", kind_byte))
    })?;

    let request = match kind {
        RequestKind::Append => Request::Append(bincode::deserialize(payload)?),
        RequestKind::Remove => Request::Remove(bincode::deserialize(payload)?),
        RequestKind::Get => Request::Get(bincode::deserialize(payload)?),
        RequestKind::Size => Request::Size(bincode::deserialize(payload)?),
        RequestKind::Ping => {
            if !payload.is_empty() {
                return Err(ListError::Protocol(format!(
                    "PING request: unexpected payload of {} bytes",
                    payload.len()
                )));
            }
            Request::Ping
        }
    };
    Ok(request)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Vec<u8> {
    encode_frame(response.status as u8, &response.payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes)?;

    let status = Status::from_byte(status_byte).ok_or_else(|| {
        ListError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    Ok(Response {
        status,
        payload: payload.to_vec(),
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request from a stream
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    let message = read_frame(reader)?;
    decode_request(&message)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader)?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
