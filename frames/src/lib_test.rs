use super::*;

#[test]
fn request_sets_fields() {
    let frame = Frame::request(EVENT_MESSAGE, Data::new());
    assert_eq!(frame.syscall, "message");
    assert_eq!(frame.status, Status::Request);
    assert!(frame.parent_id.is_none());
    assert!(frame.from.is_none());
    assert!(frame.ts > 0);
}

#[test]
fn message_carries_content() {
    let frame = Frame::message("hello");
    assert_eq!(frame.syscall, EVENT_MESSAGE);
    assert_eq!(frame.content(), Some("hello"));
}

#[test]
fn sign_in_carries_name() {
    let frame = Frame::sign_in("Aiko");
    assert_eq!(frame.syscall, "sign-in");
    assert_eq!(frame.str_field(FRAME_NAME), Some("Aiko"));
}

#[test]
fn reply_inherits_context() {
    let req = Frame::message("hi");
    let done = req.done();

    assert_eq!(done.parent_id, Some(req.id));
    assert_eq!(done.syscall, "message");
    assert_eq!(done.status, Status::Done);
    assert!(done.data.is_empty());
}

#[test]
fn error_from_typed() {
    #[derive(Debug, thiserror::Error)]
    #[error("not signed in")]
    struct NotSignedIn;

    impl ErrorCode for NotSignedIn {
        fn error_code(&self) -> &'static str {
            "E_NOT_SIGNED_IN"
        }
    }

    let req = Frame::message("hi");
    let err = req.error_from(&NotSignedIn);

    assert_eq!(err.status, Status::Error);
    assert_eq!(err.parent_id, Some(req.id));
    assert_eq!(err.str_field(FRAME_CODE), Some("E_NOT_SIGNED_IN"));
    assert_eq!(err.str_field(FRAME_MESSAGE), Some("not signed in"));
    assert_eq!(
        err.data
            .get(FRAME_RETRYABLE)
            .and_then(serde_json::Value::as_bool),
        Some(false)
    );
}

#[test]
fn plain_error_has_message_only() {
    let err = Frame::message("hi").error("boom");
    assert_eq!(err.status, Status::Error);
    assert_eq!(err.str_field(FRAME_MESSAGE), Some("boom"));
    assert!(err.str_field(FRAME_CODE).is_none());
}

#[test]
fn json_round_trip_preserves_frame() {
    let original = Frame::message("こんにちは").with_from("Aiko").with_data("extra", 3);

    let text = encode_frame(&original).expect("encode");
    let restored = decode_frame(&text).expect("decode");

    assert_eq!(restored, original);
}

#[test]
fn status_serializes_lowercase() {
    let text = encode_frame(&Frame::message("x")).expect("encode");
    assert!(text.contains("\"status\":\"request\""));
}

#[test]
fn decode_defaults_optional_fields() {
    let id = Uuid::new_v4();
    let text = format!(r#"{{"id":"{id}","syscall":"message","status":"request"}}"#);
    let frame = decode_frame(&text).expect("decode");

    assert_eq!(frame.id, id);
    assert!(frame.parent_id.is_none());
    assert!(frame.from.is_none());
    assert_eq!(frame.ts, 0);
    assert!(frame.data.is_empty());
}

#[test]
fn decode_rejects_malformed_text() {
    let err = decode_frame("{not json").expect_err("text should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn decode_rejects_unknown_status() {
    let id = Uuid::new_v4();
    let text = format!(r#"{{"id":"{id}","syscall":"message","status":"bulk"}}"#);
    assert!(decode_frame(&text).is_err());
}

#[test]
fn decode_rejects_non_object_data() {
    let id = Uuid::new_v4();
    let text = format!(r#"{{"id":"{id}","syscall":"message","status":"request","data":"hello"}}"#);
    assert!(decode_frame(&text).is_err());
}

#[test]
fn content_ignores_non_string_values() {
    let frame = Frame::request(EVENT_MESSAGE, Data::new()).with_data(FRAME_CONTENT, 42);
    assert!(frame.content().is_none());
}
