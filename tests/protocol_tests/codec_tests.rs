//! Codec Tests
//!
//! Tests for request and response encoding/decoding.

use std::io::Cursor;

use remotelist::protocol::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response, AppendReply, Reply, Request, RequestKind,
    Response, SizeReply, Status, ValueReply, MAX_PAYLOAD_SIZE,
};
use remotelist::ListError;

// =============================================================================
// Request Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_append() {
    let request = Request::append("listaA", -7);
    let encoded = encode_request(&request).unwrap();
    let decoded = decode_request(&encoded).unwrap();

    assert_eq!(decoded, request);
    assert_eq!(decoded.kind(), RequestKind::Append);
}

#[test]
fn test_encode_decode_each_kind() {
    let requests = vec![
        Request::remove("A"),
        Request::get("A", i64::MAX),
        Request::get("A", -1),
        Request::size("tenant:1"),
        Request::Ping,
    ];

    for request in requests {
        let encoded = encode_request(&request).unwrap();
        assert_eq!(encoded[0], request.kind() as u8);
        assert_eq!(decode_request(&encoded).unwrap(), request);
    }
}

#[test]
fn test_encode_decode_unicode_list_id() {
    let request = Request::append("lista-ñ-🚀", 1);
    let encoded = encode_request(&request).unwrap();

    assert_eq!(decode_request(&encoded).unwrap(), request);
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_response_ok_carries_reply() {
    let response = Response::ok(&Reply::Value(ValueReply { value: 20 })).unwrap();
    let decoded = decode_response(&encode_response(&response)).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    let reply: ValueReply = decoded.into_reply().unwrap();
    assert_eq!(reply.value, 20);
}

#[test]
fn test_response_pong_has_no_payload() {
    let response = Response::ok(&Reply::Pong).unwrap();

    assert!(response.is_ok());
    assert!(response.payload.is_empty());
    assert_eq!(encode_response(&response).len(), 5);
}

#[test]
fn test_response_from_validation_errors() {
    let cases = [
        (ListError::NotFound, Status::NotFound),
        (ListError::EmptyList, Status::EmptyList),
        (ListError::IndexOutOfRange, Status::IndexOutOfRange),
    ];

    for (error, status) in cases {
        let response = Response::from_error(&error);
        assert_eq!(response.status, status);
        assert!(response.payload.is_empty());
    }
}

#[test]
fn test_response_from_other_errors_carries_message() {
    let response = Response::from_error(&ListError::InvalidListId("".to_string()));

    assert_eq!(response.status, Status::Error);
    assert!(String::from_utf8_lossy(&response.payload).contains("invalid list id"));
}

#[test]
fn test_response_from_result() {
    let ok = Response::from_result(Ok(Reply::Size(SizeReply { size: 3 })));
    let err = Response::from_result(Err(ListError::EmptyList));

    assert_eq!(ok.into_reply::<SizeReply>().unwrap().size, 3);
    assert_eq!(err.status, Status::EmptyList);
}

#[test]
fn test_into_reply_maps_statuses_to_errors() {
    let not_found = Response::from_error(&ListError::NotFound);
    let empty = Response::from_error(&ListError::EmptyList);
    let out_of_range = Response::from_error(&ListError::IndexOutOfRange);
    let error = Response::error("disk full");

    assert!(matches!(not_found.into_reply::<ValueReply>(), Err(ListError::NotFound)));
    assert!(matches!(empty.into_reply::<ValueReply>(), Err(ListError::EmptyList)));
    assert!(matches!(
        out_of_range.into_reply::<ValueReply>(),
        Err(ListError::IndexOutOfRange)
    ));
    match error.into_reply::<AppendReply>() {
        Err(ListError::Remote(message)) => assert_eq!(message, "disk full"),
        other => panic!("expected remote error, got {:?}", other),
    }
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_incomplete_header() {
    let bytes = [0x01, 0x00, 0x00]; // Only 3 bytes, need 5
    let result = decode_request(&bytes);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Incomplete header"));
}

#[test]
fn test_incomplete_payload() {
    // Header says 10 bytes payload, but only 5 provided
    let bytes = [0x01, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x05, 0x68];
    let result = decode_request(&bytes);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Incomplete"));
}

#[test]
fn test_payload_too_large() {
    let len = (MAX_PAYLOAD_SIZE + 1).to_be_bytes();
    let bytes = [0x01, len[0], len[1], len[2], len[3]];

    let result = decode_request(&bytes);
    assert!(result.unwrap_err().to_string().contains("Payload too large"));

    // The stream reader refuses before allocating the payload
    let result = read_request(&mut Cursor::new(bytes.to_vec()));
    assert!(matches!(result, Err(ListError::Protocol(_))));
}

#[test]
fn test_unknown_request_kind() {
    let bytes = [0xFF, 0x00, 0x00, 0x00, 0x00];
    let result = decode_request(&bytes);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unknown request kind"));
}

#[test]
fn test_unknown_response_status() {
    let bytes = [0xFF, 0x00, 0x00, 0x00, 0x00];
    let result = decode_response(&bytes);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unknown response status"));
}

#[test]
fn test_append_with_short_payload() {
    // APPEND whose payload is too short for its arguments
    let bytes = [0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00];
    let result = decode_request(&bytes);
    assert!(matches!(result, Err(ListError::Serialization(_))));
}

#[test]
fn test_ping_with_unexpected_payload() {
    let bytes = [0x05, 0x00, 0x00, 0x00, 0x05, 0x68, 0x65, 0x6C, 0x6C, 0x6F];
    let result = decode_request(&bytes);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("unexpected payload"));
}

#[test]
fn test_truncated_stream() {
    let encoded = encode_request(&Request::append("A", 1)).unwrap();
    let mut cursor = Cursor::new(encoded[..encoded.len() - 3].to_vec());

    let result = read_request(&mut cursor);
    assert!(matches!(result, Err(ListError::Io(_))));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_multiple_requests() {
    let requests = vec![
        Request::Ping,
        Request::append("k1", 1),
        Request::get("k1", 0),
        Request::size("k1"),
        Request::remove("k1"),
    ];

    let mut buffer = Vec::new();
    for request in &requests {
        write_request(&mut buffer, request).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &requests {
        assert_eq!(&read_request(&mut cursor).unwrap(), expected);
    }
}

#[test]
fn test_stream_multiple_responses() {
    let responses = vec![
        Response::ok(&Reply::Append(AppendReply { success: true })).unwrap(),
        Response::from_error(&ListError::NotFound),
        Response::error("oops"),
        Response::ok(&Reply::Pong).unwrap(),
    ];

    let mut buffer = Vec::new();
    for response in &responses {
        write_response(&mut buffer, response).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &responses {
        assert_eq!(&read_response(&mut cursor).unwrap(), expected);
    }
}

// =============================================================================
// Wire Format Verification Tests
// =============================================================================

#[test]
fn test_wire_format_append() {
    let encoded = encode_request(&Request::append("A", 10)).unwrap();

    // [0x01][len 17][string len (u64 LE) = 1]['A'][value (i64 LE) = 10]
    assert_eq!(encoded[0], 0x01);
    assert_eq!(&encoded[1..5], &[0x00, 0x00, 0x00, 0x11]);
    assert_eq!(&encoded[5..13], &1u64.to_le_bytes());
    assert_eq!(encoded[13], b'A');
    assert_eq!(&encoded[14..22], &10i64.to_le_bytes());
    assert_eq!(encoded.len(), 22);
}

#[test]
fn test_wire_format_response_error() {
    let encoded = encode_response(&Response::error("hi"));

    assert_eq!(encoded[0], 0x04);
    assert_eq!(&encoded[1..5], &[0x00, 0x00, 0x00, 0x02]);
    assert_eq!(&encoded[5..7], b"hi");
}

#[test]
fn test_wire_format_status_codes() {
    let statuses = [
        (Status::Ok, 0x00u8),
        (Status::NotFound, 0x01),
        (Status::EmptyList, 0x02),
        (Status::IndexOutOfRange, 0x03),
        (Status::Error, 0x04),
    ];

    for (status, byte) in statuses {
        assert_eq!(status as u8, byte);
        assert_eq!(Status::from_byte(byte), Some(status));
    }
    assert_eq!(Status::from_byte(0x05), None);
}
