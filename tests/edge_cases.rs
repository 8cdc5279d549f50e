//! Edge case tests for malformed and boundary-size frames

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::{BufMut, BytesMut};
use radar_hub_protocol::{
    ErrorKind, HubMessage, HubProtocol, MessageType, Payload, PayloadRegistry, PayloadSerializer,
    PayloadType, ProtocolError, StaticBinder, Vector2, Vector3,
};
use std::sync::Arc;

fn frame(tag: i32, body: &[u8]) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u32_le((4 + body.len()) as u32);
    buf.put_i32_le(tag);
    buf.put_slice(body);
    buf
}

fn parse(buf: &mut BytesMut, binder: &StaticBinder) -> Result<Option<HubMessage>, ProtocolError> {
    HubProtocol::default().try_parse_message(buf, binder)
}

#[test]
fn test_negative_frame_length_rejected() {
    let mut buf = BytesMut::new();
    buf.put_i32_le(-8);
    buf.put_i32_le(MessageType::Ping.tag());

    let err = parse(&mut buf, &StaticBinder::new()).unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidFrameLength(-8)));
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_zero_and_negative_tags_rejected() {
    for tag in [0, -1, i32::MIN, i32::MAX] {
        let mut buf = frame(tag, &[]);
        let err = parse(&mut buf, &StaticBinder::new()).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownMessageType(t) if t == tag));
    }
}

#[test]
fn test_frame_at_max_size_accepted() {
    let protocol = HubProtocol::default();
    let message = HubMessage::CancelInvocation {
        invocation_id: "x".repeat(60),
    };
    let bytes = protocol.message_bytes(&message).unwrap();
    let frame_len = bytes.len() - 4;

    let exact = radar_hub_protocol::FrameCodec::default().with_max_frame_size(frame_len);
    let binder = StaticBinder::new();
    assert!(exact.try_decode(&bytes, &binder).is_ok());

    let smaller = radar_hub_protocol::FrameCodec::default().with_max_frame_size(frame_len - 1);
    assert!(matches!(
        smaller.try_decode(&bytes, &binder),
        Err(ProtocolError::OversizedFrame(n)) if n == frame_len
    ));
}

#[test]
fn test_negative_string_length_rejected() {
    let mut buf = frame(MessageType::CancelInvocation.tag(), &(-2i32).to_le_bytes());
    let err = parse(&mut buf, &StaticBinder::new()).unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidLength(-2)));
}

#[test]
fn test_invalid_utf8_rejected() {
    let mut body = 2i32.to_le_bytes().to_vec();
    body.extend_from_slice(&[0xC3, 0x28]);

    let mut buf = frame(MessageType::CancelInvocation.tag(), &body);
    let err = parse(&mut buf, &StaticBinder::new()).unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidUtf8(_)));
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_close_missing_flag_is_truncated() {
    let mut buf = frame(MessageType::Close.tag(), &(-1i32).to_le_bytes());
    let err = parse(&mut buf, &StaticBinder::new()).unwrap_err();
    assert!(matches!(err, ProtocolError::Truncated { needed: 1, remaining: 0 }));
}

#[test]
fn test_close_flag_nonzero_is_true() {
    let mut body = (-1i32).to_le_bytes().to_vec();
    body.push(0x7F);

    let mut buf = frame(MessageType::Close.tag(), &body);
    let parsed = parse(&mut buf, &StaticBinder::new()).unwrap();
    assert_eq!(
        parsed,
        Some(HubMessage::Close {
            error: None,
            allow_reconnect: true
        })
    );
}

#[test]
fn test_argument_count_larger_than_body_rejected() {
    let binder = StaticBinder::new();
    binder
        .bind_target("Aim", vec![PayloadType::of::<Vector3>(); 3])
        .unwrap();

    let mut body = Vec::new();
    body.extend_from_slice(&(-1i32).to_le_bytes());
    body.extend_from_slice(&3i32.to_le_bytes());
    body.extend_from_slice(b"Aim");
    // Claims three arguments but carries none
    body.extend_from_slice(&3i32.to_le_bytes());

    let mut buf = frame(MessageType::Invocation.tag(), &body);
    let err = parse(&mut buf, &binder).unwrap_err();
    assert!(matches!(err, ProtocolError::Truncated { .. }));
}

#[test]
fn test_fixed_layout_payload_wrong_size_rejected() {
    let binder = StaticBinder::new();
    binder
        .bind_invocation("v", PayloadType::of::<Vector2>())
        .unwrap();

    let mut body = Vec::new();
    body.extend_from_slice(&1i32.to_le_bytes());
    body.push(b'v');
    // Vector2 needs 8 bytes; send 12
    body.extend_from_slice(&12u32.to_le_bytes());
    body.extend_from_slice(&[0u8; 12]);

    let mut buf = frame(MessageType::StreamItem.tag(), &body);
    let err = parse(&mut buf, &binder).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::FixedLayoutSize {
            expected: 8,
            actual: 12,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Payload);
}

#[test]
fn test_unregistered_payload_type() {
    let registry = Arc::new(PayloadRegistry::new());
    let protocol = HubProtocol::with_serializer(registry.clone());

    let message = HubMessage::StreamItem {
        invocation_id: "1".into(),
        item: Payload::new(Vector3::default()),
    };
    let err = protocol.message_bytes(&message).unwrap_err();
    assert!(matches!(err, ProtocolError::UnregisteredType(_)));

    registry.register_fixed::<Vector3>().unwrap();
    let bytes = protocol.message_bytes(&message).unwrap();
    assert!(!bytes.is_empty());
    assert!(registry.serialize(&Payload::new(1i32)).is_err());
}

#[test]
fn test_empty_buffer_is_incomplete() {
    let mut buf = BytesMut::new();
    assert_eq!(parse(&mut buf, &StaticBinder::new()).unwrap(), None);
}
