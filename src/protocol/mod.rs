//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Kind (1) │ Len (4)  │   Payload (bincode)         │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Requests
//! - 0x01: APPEND - Payload: AppendArgs { list_id, value }
//! - 0x02: REMOVE - Payload: RemoveArgs { list_id }
//! - 0x03: GET    - Payload: GetArgs { list_id, index }
//! - 0x04: SIZE   - Payload: SizeArgs { list_id }
//! - 0x05: PING   - Payload: empty
//!
//! ### Response Status Codes
//! - 0x00: OK                - Payload: the reply struct for the request
//! - 0x01: NOT_FOUND
//! - 0x02: EMPTY_LIST
//! - 0x03: INDEX_OUT_OF_RANGE
//! - 0x04: ERROR             - Payload: message string

mod request;
mod response;
mod codec;

pub use request::{AppendArgs, GetArgs, RemoveArgs, Request, RequestKind, SizeArgs};
pub use response::{AppendReply, Reply, Response, SizeReply, Status, ValueReply};
pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
