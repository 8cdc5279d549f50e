//! # Frame Codec
//!
//! Turns [`HubMessage`]s into length-prefixed frames and back.
//!
//! ## Wire Format
//! ```text
//! [Length: u32 LE][Tag: i32 LE][Body: Length - 4 bytes]
//! ```
//! `Length` counts the tag and the body, never itself.
//!
//! [`FrameCodec`] is stateless apart from its configuration and may be shared
//! across threads; [`HubCodec`] adapts it to `tokio_util::codec` so a
//! transport can be wrapped in `Framed`. A single byte stream must be decoded
//! by exactly one cursor owner at a time.

use crate::config::MAX_FRAME_SIZE;
use crate::core::serialization::{PayloadRegistry, PayloadSerializer};
use crate::error::{ProtocolError, Result};
use crate::protocol::binder::InvocationBinder;
use crate::protocol::message::{HubMessage, MessageType};
use crate::utils::metrics::global_metrics;
use bytes::{Buf, BufMut, BytesMut};
use std::sync::Arc;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

/// Size of the frame length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of the message type tag
pub const MESSAGE_TYPE_SIZE: usize = 4;

/// Bytes needed before a frame can be inspected
pub const HEADER_SIZE: usize = LENGTH_PREFIX_SIZE + MESSAGE_TYPE_SIZE;

/// Result of one decode attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// The buffer does not hold a complete frame yet. Nothing was consumed.
    NotEnoughData,
    /// One frame was decoded; the caller advances its cursor by `consumed`.
    Message {
        message: HubMessage,
        consumed: usize,
    },
}

/// Stateless frame encoder/decoder.
#[derive(Clone)]
pub struct FrameCodec {
    serializer: Arc<dyn PayloadSerializer>,
    max_frame_size: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(PayloadRegistry::global())
    }
}

impl FrameCodec {
    pub fn new(serializer: Arc<dyn PayloadSerializer>) -> Self {
        Self {
            serializer,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    /// Override the largest frame length accepted from a peer.
    ///
    /// The cap only applies to inbound frames. Encoding a larger frame still
    /// succeeds and logs a warning.
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    pub fn serializer(&self) -> &Arc<dyn PayloadSerializer> {
        &self.serializer
    }

    /// Append one frame to `dst`.
    ///
    /// On error `dst` is restored to its previous length, so a partial frame
    /// is never left behind.
    pub fn encode(&self, message: &HubMessage, dst: &mut BytesMut) -> Result<()> {
        let start = dst.len();

        // Length is patched in once the body size is known
        dst.put_u32_le(0);
        dst.put_i32_le(message.message_type().tag());

        if let Err(e) = message.write_body(dst, &*self.serializer) {
            dst.truncate(start);
            global_metrics().protocol_error();
            return Err(e);
        }

        let frame_len = dst.len() - start - LENGTH_PREFIX_SIZE;
        if frame_len > i32::MAX as usize {
            dst.truncate(start);
            return Err(ProtocolError::OversizedFrame(frame_len));
        }
        dst[start..start + LENGTH_PREFIX_SIZE].copy_from_slice(&(frame_len as u32).to_le_bytes());

        if frame_len > self.max_frame_size {
            warn!(
                message_type = message.message_type().name(),
                frame_len,
                max_frame_size = self.max_frame_size,
                "Encoded frame exceeds the configured inbound limit"
            );
        }

        trace!(
            message_type = message.message_type().name(),
            frame_len,
            "Encoded frame"
        );
        global_metrics().frame_encoded((frame_len + LENGTH_PREFIX_SIZE) as u64);
        Ok(())
    }

    /// Try to decode one frame from the front of `src`.
    ///
    /// `src` is only read. Calling again after more bytes were appended picks
    /// up where the previous attempt left off.
    pub fn try_decode(&self, src: &[u8], binder: &dyn InvocationBinder) -> Result<DecodeOutcome> {
        if src.len() < HEADER_SIZE {
            global_metrics().incomplete_read();
            return Ok(DecodeOutcome::NotEnoughData);
        }

        let declared = i32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        if declared < MESSAGE_TYPE_SIZE as i32 {
            return Err(self.fatal(ProtocolError::InvalidFrameLength(declared)));
        }
        let frame_len = declared as usize;
        if frame_len > self.max_frame_size {
            return Err(self.fatal(ProtocolError::OversizedFrame(frame_len)));
        }

        let total = LENGTH_PREFIX_SIZE + frame_len;
        if src.len() < total {
            global_metrics().incomplete_read();
            return Ok(DecodeOutcome::NotEnoughData);
        }

        let frame = &src[LENGTH_PREFIX_SIZE..total];
        let tag = i32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
        let message_type = MessageType::try_from(tag).map_err(|e| self.fatal(e))?;

        let message = HubMessage::parse_body(
            message_type,
            &frame[MESSAGE_TYPE_SIZE..],
            binder,
            &*self.serializer,
        )
        .map_err(|e| self.fatal(e))?;

        trace!(message_type = message_type.name(), frame_len, "Decoded frame");
        global_metrics().frame_decoded(total as u64);
        Ok(DecodeOutcome::Message {
            message,
            consumed: total,
        })
    }

    fn fatal(&self, err: ProtocolError) -> ProtocolError {
        warn!(error = %err, kind = ?err.kind(), "Failed to decode frame");
        global_metrics().protocol_error();
        err
    }
}

/// `tokio_util` codec over a [`FrameCodec`] and the host's binder.
pub struct HubCodec<B: ?Sized> {
    frames: FrameCodec,
    binder: Arc<B>,
}

impl<B: InvocationBinder + ?Sized> HubCodec<B> {
    pub fn new(frames: FrameCodec, binder: Arc<B>) -> Self {
        Self { frames, binder }
    }

    pub fn binder(&self) -> &Arc<B> {
        &self.binder
    }
}

impl<B: InvocationBinder + ?Sized> Decoder for HubCodec<B> {
    type Item = HubMessage;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        match self.frames.try_decode(&src[..], &self.binder)? {
            DecodeOutcome::NotEnoughData => {
                // Reserve for the rest of the frame once its length is known
                if src.len() >= LENGTH_PREFIX_SIZE {
                    let declared = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;
                    if declared <= self.frames.max_frame_size() {
                        src.reserve((LENGTH_PREFIX_SIZE + declared).saturating_sub(src.len()));
                    }
                }
                Ok(None)
            }
            DecodeOutcome::Message { message, consumed } => {
                src.advance(consumed);
                Ok(Some(message))
            }
        }
    }
}

impl<B: InvocationBinder + ?Sized> Encoder<HubMessage> for HubCodec<B> {
    type Error = ProtocolError;

    fn encode(&mut self, item: HubMessage, dst: &mut BytesMut) -> Result<()> {
        self.frames.encode(&item, dst)
    }
}

impl<B: InvocationBinder + ?Sized> Encoder<&HubMessage> for HubCodec<B> {
    type Error = ProtocolError;

    fn encode(&mut self, item: &HubMessage, dst: &mut BytesMut) -> Result<()> {
        self.frames.encode(item, dst)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::protocol::binder::StaticBinder;

    fn codec() -> FrameCodec {
        FrameCodec::default()
    }

    #[test]
    fn test_ping_wire_bytes() {
        let mut buf = BytesMut::new();
        codec().encode(&HubMessage::Ping, &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x04, 0, 0, 0, 0x06, 0, 0, 0]);
    }

    #[test]
    fn test_cancel_invocation_wire_bytes() {
        let mut buf = BytesMut::new();
        let message = HubMessage::CancelInvocation {
            invocation_id: "abc".into(),
        };
        codec().encode(&message, &mut buf).unwrap();

        assert_eq!(&buf[0..4], &11u32.to_le_bytes());
        assert_eq!(&buf[4..8], &5i32.to_le_bytes());
        assert_eq!(&buf[8..], &[0x03, 0, 0, 0, b'a', b'b', b'c']);
        assert_eq!(buf.len(), 15);
    }

    #[test]
    fn test_short_header_is_not_enough_data() {
        let binder = StaticBinder::new();
        for len in 0..HEADER_SIZE {
            let src = vec![0x04; len];
            assert_eq!(
                codec().try_decode(&src, &binder).unwrap(),
                DecodeOutcome::NotEnoughData
            );
        }
    }

    #[test]
    fn test_frame_length_below_tag_size_rejected() {
        let binder = StaticBinder::new();
        let src = [0x03, 0, 0, 0, 0x06, 0, 0, 0];
        let err = codec().try_decode(&src, &binder).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidFrameLength(3)));
    }

    #[test]
    fn test_oversized_frame_rejected_before_buffering() {
        let binder = StaticBinder::new();
        let codec = codec().with_max_frame_size(64);
        let mut src = 65u32.to_le_bytes().to_vec();
        src.extend_from_slice(&6i32.to_le_bytes());

        let err = codec.try_decode(&src, &binder).unwrap_err();
        assert!(matches!(err, ProtocolError::OversizedFrame(65)));
    }

    #[test]
    fn test_encode_ignores_inbound_cap() {
        let binder = StaticBinder::new();
        let capped = codec().with_max_frame_size(64);
        let message = HubMessage::CancelInvocation {
            invocation_id: "x".repeat(100),
        };

        let mut buf = BytesMut::new();
        capped.encode(&message, &mut buf).unwrap();
        assert_eq!(buf.len(), 112);

        // Same limit on the receiving side rejects it
        let err = capped.try_decode(&buf, &binder).unwrap_err();
        assert!(matches!(err, ProtocolError::OversizedFrame(108)));
        let outcome = codec().try_decode(&buf, &binder).unwrap();
        assert!(matches!(outcome, DecodeOutcome::Message { consumed: 112, .. }));
    }

    #[test]
    fn test_failed_encode_leaves_buffer_untouched() {
        let mut buf = BytesMut::new();
        codec().encode(&HubMessage::Ping, &mut buf).unwrap();

        // u16 is not registered in the default registry
        let bad = HubMessage::Invocation {
            invocation_id: None,
            target: "Echo".into(),
            arguments: vec![crate::core::serialization::Payload::new(1u16)],
        };
        assert!(codec().encode(&bad, &mut buf).is_err());
        assert_eq!(&buf[..], &[0x04, 0, 0, 0, 0x06, 0, 0, 0]);
    }

    #[test]
    fn test_decoder_advances_past_each_frame() {
        let mut hub = HubCodec::new(codec(), Arc::new(StaticBinder::new()));
        let mut buf = BytesMut::new();
        hub.encode(HubMessage::Ping, &mut buf).unwrap();
        hub.encode(
            &HubMessage::Close {
                error: None,
                allow_reconnect: true,
            },
            &mut buf,
        )
        .unwrap();

        assert_eq!(hub.decode(&mut buf).unwrap(), Some(HubMessage::Ping));
        assert!(matches!(
            hub.decode(&mut buf).unwrap(),
            Some(HubMessage::Close {
                allow_reconnect: true,
                ..
            })
        ));
        assert_eq!(hub.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }
}
