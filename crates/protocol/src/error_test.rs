//! Tests for protocol error types

use crate::error::ProtocolError;

#[test]
fn test_error_creation_missing_type() {
    let err = ProtocolError::missing_type(7);
    assert!(matches!(err, ProtocolError::MissingType { line: 7 }));
    assert_eq!(err.line(), Some(7));
}

#[test]
fn test_error_creation_not_an_object() {
    let err = ProtocolError::not_an_object(3, "array");
    assert!(matches!(
        err,
        ProtocolError::NotAnObject {
            line: 3,
            kind: "array"
        }
    ));
}

#[test]
fn test_error_creation_invalid_json() {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = ProtocolError::invalid_json(12, source);
    assert_eq!(err.line(), Some(12));
}

#[test]
fn test_io_error_has_no_line() {
    let err = ProtocolError::from(std::io::Error::other("boom"));
    assert_eq!(err.line(), None);
}

#[test]
fn test_error_display() {
    let err = ProtocolError::missing_type(42);
    let msg = err.to_string();
    assert!(msg.contains("42"));
    assert!(msg.contains("type"));

    let err = ProtocolError::not_an_object(1, "string");
    assert!(err.to_string().contains("string"));
}
