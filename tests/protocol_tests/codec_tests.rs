//! Codec Tests
//!
//! Tests for header parsing, request/response encoding and stream I/O.

use std::io::Cursor;

use bytes::Bytes;
use linekv::protocol::{
    encode_command, encode_response, parse_header, read_command, read_line, read_response,
    write_command, write_response, Command, CommandType, FrameLimits, Header, Incoming, Line,
    Response,
};
use linekv::KvError;

// =============================================================================
// Helper Functions
// =============================================================================

fn limits() -> FrameLimits {
    FrameLimits::default()
}

fn read_all(bytes: &[u8], limits: &FrameLimits) -> Vec<Incoming> {
    let mut cursor = Cursor::new(bytes.to_vec());
    let mut out = Vec::new();
    loop {
        match read_command(&mut cursor, limits).unwrap() {
            Incoming::Eof => return out,
            incoming => out.push(incoming),
        }
    }
}

fn expect_command(incoming: &Incoming) -> &Command {
    match incoming {
        Incoming::Command(command) => command,
        other => panic!("Expected command, got {:?}", other),
    }
}

fn expect_rejected(incoming: &Incoming) -> &KvError {
    match incoming {
        Incoming::Rejected(e) => e,
        other => panic!("Expected rejection, got {:?}", other),
    }
}

// =============================================================================
// Header Parsing Tests
// =============================================================================

#[test]
fn test_parse_header_forms() {
    assert_eq!(
        parse_header(b"CREATE 1 5").unwrap(),
        Header { command_type: CommandType::Create, key: 1, size: 5 }
    );
    assert_eq!(
        parse_header(b"UPDATE -3 2").unwrap(),
        Header { command_type: CommandType::Update, key: -3, size: 2 }
    );
    assert_eq!(
        parse_header(b"READ 42").unwrap(),
        Header { command_type: CommandType::Read, key: 42, size: 0 }
    );
    assert_eq!(
        parse_header(b"DELETE +7").unwrap(),
        Header { command_type: CommandType::Delete, key: 7, size: 0 }
    );
}

#[test]
fn test_parse_header_case_insensitive_verb() {
    let header = parse_header(b"cReAtE 1 0").unwrap();
    assert_eq!(header.command_type, CommandType::Create);

    let header = parse_header(b"read 1").unwrap();
    assert_eq!(header.command_type, CommandType::Read);
}

#[test]
fn test_parse_header_any_whitespace_separates() {
    assert_eq!(
        parse_header(b"READ\t1").unwrap(),
        Header { command_type: CommandType::Read, key: 1, size: 0 }
    );
    assert_eq!(
        parse_header(b"create \t 2\t3").unwrap(),
        Header { command_type: CommandType::Create, key: 2, size: 3 }
    );
}

#[test]
fn test_parse_header_unknown_verb() {
    assert!(matches!(parse_header(b"PUT 1 2"), Err(KvError::UnknownCommand)));
    assert!(matches!(parse_header(b"GET"), Err(KvError::UnknownCommand)));
}

#[test]
fn test_parse_header_malformed() {
    let cases: &[&[u8]] = &[
        b"",
        b"   ",
        b"READ",
        b"READ abc",
        b"READ 1 2",
        b"CREATE 1",
        b"CREATE x 5",
        b"CREATE 1 -5",
        b"CREATE 1 +5",
        b"CREATE 1 five",
        b"CREATE 1 5 extra",
        b"DELETE 99999999999",
        b"READ \xff",
    ];
    for case in cases {
        assert!(
            matches!(parse_header(case), Err(KvError::Malformed)),
            "expected malformed for {:?}",
            String::from_utf8_lossy(case)
        );
    }
}

// =============================================================================
// Line Reading Tests
// =============================================================================

#[test]
fn test_read_line_strips_crlf() {
    let mut cursor = Cursor::new(b"READ 1\r\nREAD 2\n".to_vec());

    assert_eq!(read_line(&mut cursor, 64).unwrap(), Line::Complete(b"READ 1".to_vec()));
    assert_eq!(read_line(&mut cursor, 64).unwrap(), Line::Complete(b"READ 2".to_vec()));
    assert_eq!(read_line(&mut cursor, 64).unwrap(), Line::Eof);
}

#[test]
fn test_read_line_too_long_is_drained() {
    let mut input = vec![b'A'; 100];
    input.extend_from_slice(b"\nREAD 1\n");
    let mut cursor = Cursor::new(input);

    assert_eq!(read_line(&mut cursor, 16).unwrap(), Line::TooLong);
    assert_eq!(read_line(&mut cursor, 16).unwrap(), Line::Complete(b"READ 1".to_vec()));
}

#[test]
fn test_read_line_at_limit() {
    let mut cursor = Cursor::new(b"READ 1\r\n".to_vec());
    assert_eq!(read_line(&mut cursor, 6).unwrap(), Line::Complete(b"READ 1".to_vec()));

    let mut cursor = Cursor::new(b"READ 10\n".to_vec());
    assert_eq!(read_line(&mut cursor, 6).unwrap(), Line::TooLong);
}

#[test]
fn test_read_line_eof_mid_line() {
    let mut cursor = Cursor::new(b"READ 1".to_vec());
    let result = read_line(&mut cursor, 64);
    assert!(matches!(result, Err(KvError::Io(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof));
}

// =============================================================================
// Command Decoding Tests
// =============================================================================

#[test]
fn test_read_create_with_payload() {
    let incoming = read_all(b"CREATE 1 5\nhello", &limits());

    assert_eq!(incoming.len(), 1);
    assert_eq!(
        expect_command(&incoming[0]),
        &Command::Create { key: 1, value: b"hello".to_vec() }
    );
}

#[test]
fn test_payload_is_byte_transparent() {
    let mut input = b"UPDATE 4 13\n".to_vec();
    input.extend_from_slice(b"a b\tc\r\nREAD 1");
    let incoming = read_all(&input, &limits());

    assert_eq!(
        expect_command(&incoming[0]),
        &Command::Update { key: 4, value: b"a b\tc\r\nREAD 1".to_vec() }
    );
}

#[test]
fn test_create_with_zero_size() {
    let incoming = read_all(b"CREATE 1 0\nREAD 1\n", &limits());

    assert_eq!(incoming.len(), 2);
    assert_eq!(expect_command(&incoming[0]), &Command::Create { key: 1, value: vec![] });
    assert_eq!(expect_command(&incoming[1]), &Command::Read { key: 1 });
}

#[test]
fn test_update_with_zero_size_rejected() {
    let incoming = read_all(b"UPDATE 9 0\nDELETE 9\n", &limits());

    assert_eq!(incoming.len(), 2);
    assert!(matches!(expect_rejected(&incoming[0]), KvError::SizeRule));
    assert_eq!(expect_command(&incoming[1]), &Command::Delete { key: 9 });
}

#[test]
fn test_pipelined_requests_keep_order() {
    let input = b"CREATE 1 3\nabcREAD 1\nBOGUS 1\nUPDATE 1 2\nxyDELETE 1\n";
    let incoming = read_all(input, &limits());

    assert_eq!(incoming.len(), 5);
    assert_eq!(expect_command(&incoming[0]), &Command::Create { key: 1, value: b"abc".to_vec() });
    assert_eq!(expect_command(&incoming[1]), &Command::Read { key: 1 });
    assert!(matches!(expect_rejected(&incoming[2]), KvError::UnknownCommand));
    assert_eq!(expect_command(&incoming[3]), &Command::Update { key: 1, value: b"xy".to_vec() });
    assert_eq!(expect_command(&incoming[4]), &Command::Delete { key: 1 });
}

#[test]
fn test_oversized_value_is_drained_and_rejected() {
    let limits = FrameLimits { max_value_size: 4, max_header_len: 64 };
    let incoming = read_all(b"CREATE 1 6\nabcdefREAD 1\n", &limits);

    assert_eq!(incoming.len(), 2);
    assert!(matches!(expect_rejected(&incoming[0]), KvError::Malformed));
    assert_eq!(expect_command(&incoming[1]), &Command::Read { key: 1 });
}

#[test]
fn test_oversized_header_is_rejected() {
    let limits = FrameLimits { max_value_size: 64, max_header_len: 8 };
    let incoming = read_all(b"CREATE 123456 1\nREAD 1\n", &limits);

    assert_eq!(incoming.len(), 2);
    assert!(matches!(expect_rejected(&incoming[0]), KvError::Malformed));
    assert_eq!(expect_command(&incoming[1]), &Command::Read { key: 1 });
}

#[test]
fn test_truncated_payload_is_fatal() {
    let mut cursor = Cursor::new(b"CREATE 1 10\nhello".to_vec());
    let result = read_command(&mut cursor, &limits());

    assert!(matches!(
        result,
        Err(KvError::PrematureEof { expected: 10, received: 5 })
    ));
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_wire_format_commands() {
    assert_eq!(
        encode_command(&Command::Create { key: 1, value: b"hello".to_vec() }),
        b"CREATE 1 5\nhello"
    );
    assert_eq!(
        encode_command(&Command::Update { key: -7, value: b"bye".to_vec() }),
        b"UPDATE -7 3\nbye"
    );
    assert_eq!(encode_command(&Command::Read { key: 42 }), b"READ 42\n");
    assert_eq!(encode_command(&Command::Delete { key: 2 }), b"DELETE 2\n");
}

#[test]
fn test_wire_format_responses() {
    assert_eq!(encode_response(&Response::ok()), b"OK\n");
    assert_eq!(encode_response(&Response::value(&b"hello"[..])), b"OK 5\nhello");
    assert_eq!(encode_response(&Response::value(Bytes::new())), b"OK 0\n");
    assert_eq!(
        encode_response(&Response::error(&KvError::KeyNotFound)),
        b"ERR no such key\n"
    );
    assert_eq!(
        encode_response(&Response::error(&KvError::SizeRule)),
        b"ERR size must be > 0\n"
    );
}

#[test]
fn test_stream_write_read_command() {
    let cmd = Command::Create { key: 3, value: b"hi  ".to_vec() };

    let mut buffer = Vec::new();
    write_command(&mut buffer, &cmd).unwrap();

    let mut cursor = Cursor::new(buffer);
    match read_command(&mut cursor, &limits()).unwrap() {
        Incoming::Command(decoded) => assert_eq!(decoded, cmd),
        other => panic!("Expected command, got {:?}", other),
    }
}

// =============================================================================
// Response Decoding Tests
// =============================================================================

#[test]
fn test_stream_multiple_responses() {
    let responses = vec![
        Response::value(&b"data\nwith newline"[..]),
        Response::error(&KvError::KeyExists),
        Response::ok(),
        Response::value(Bytes::new()),
    ];

    let mut buffer = Vec::new();
    for resp in &responses {
        write_response(&mut buffer, resp).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &responses {
        assert_eq!(&read_response(&mut cursor, &limits()).unwrap(), expected);
    }
}

#[test]
fn test_read_response_error_text() {
    let mut cursor = Cursor::new(b"ERR key exists\r\n".to_vec());
    assert_eq!(
        read_response(&mut cursor, &limits()).unwrap(),
        Response::Error("key exists".to_string())
    );
}

#[test]
fn test_read_response_truncated_value() {
    let mut cursor = Cursor::new(b"OK 10\nabc".to_vec());
    let result = read_response(&mut cursor, &limits());

    assert!(matches!(
        result,
        Err(KvError::TruncatedValue { expected: 10, received: 3 })
    ));
    assert_eq!(result.unwrap_err().to_string(), "truncated value from server");
}

#[test]
fn test_read_response_closed() {
    let mut cursor = Cursor::new(Vec::new());
    assert!(matches!(
        read_response(&mut cursor, &limits()),
        Err(KvError::ConnectionClosed)
    ));
}

#[test]
fn test_read_response_unexpected() {
    let mut cursor = Cursor::new(b"HELLO\n".to_vec());
    let result = read_response(&mut cursor, &limits());

    assert_eq!(result.unwrap_err().to_string(), "unexpected response: HELLO");
}

#[test]
fn test_read_response_oversized_value_is_skipped() {
    let limits = FrameLimits { max_value_size: 8, max_header_len: 64 };
    let mut cursor = Cursor::new(b"OK 10\n0123456789OK\n".to_vec());

    let result = read_response(&mut cursor, &limits);
    assert!(matches!(result, Err(KvError::ValueTooLarge { size: 10, max: 8 })));
    assert!(!result.unwrap_err().is_transport());

    assert_eq!(read_response(&mut cursor, &limits).unwrap(), Response::Ok);
}

#[test]
fn test_read_response_oversized_value_cut_short() {
    let limits = FrameLimits { max_value_size: 2, max_header_len: 64 };
    let mut cursor = Cursor::new(b"OK 10\nabc".to_vec());

    assert!(matches!(
        read_response(&mut cursor, &limits),
        Err(KvError::TruncatedValue { expected: 10, received: 3 })
    ));
}
