//! Hub-facing protocol object.
//!
//! A hub negotiates a protocol by name and version, then hands every outgoing
//! message to `write_message` and every chunk of received bytes to
//! `try_parse_message`. [`HubProtocol`] exposes exactly that surface on top of
//! the frame codec.

use crate::config::{CodecConfig, PROTOCOL_NAME, PROTOCOL_VERSION};
use crate::core::codec::{DecodeOutcome, FrameCodec, HubCodec};
use crate::core::serialization::PayloadSerializer;
use crate::error::Result;
use crate::protocol::binder::InvocationBinder;
use crate::protocol::message::HubMessage;
use bytes::{Buf, Bytes, BytesMut};
use std::sync::Arc;

/// Transport framing a protocol requires from the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFormat {
    Text,
    Binary,
}

#[derive(Clone)]
pub struct HubProtocol {
    name: String,
    frames: FrameCodec,
}

impl Default for HubProtocol {
    fn default() -> Self {
        Self {
            name: PROTOCOL_NAME.to_string(),
            frames: FrameCodec::default(),
        }
    }
}

impl HubProtocol {
    /// Build from configuration, using the process-wide payload registry
    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            name: config.name.clone(),
            frames: FrameCodec::default().with_max_frame_size(config.max_frame_size),
        }
    }

    /// Build around a custom payload serializer
    pub fn with_serializer(serializer: Arc<dyn PayloadSerializer>) -> Self {
        Self {
            name: PROTOCOL_NAME.to_string(),
            frames: FrameCodec::new(serializer),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> i32 {
        PROTOCOL_VERSION
    }

    pub fn transfer_format(&self) -> TransferFormat {
        TransferFormat::Binary
    }

    pub fn is_version_supported(&self, version: i32) -> bool {
        version == self.version()
    }

    pub fn frames(&self) -> &FrameCodec {
        &self.frames
    }

    /// Append one encoded frame to `output`
    pub fn write_message(&self, message: &HubMessage, output: &mut BytesMut) -> Result<()> {
        self.frames.encode(message, output)
    }

    /// Encode one frame into its own buffer
    pub fn message_bytes(&self, message: &HubMessage) -> Result<Bytes> {
        let mut output = BytesMut::new();
        self.frames.encode(message, &mut output)?;
        Ok(output.freeze())
    }

    /// Parse the next message from `input`, advancing it past the frame.
    ///
    /// Returns `Ok(None)` and leaves `input` untouched while the frame is
    /// still incomplete.
    pub fn try_parse_message(
        &self,
        input: &mut BytesMut,
        binder: &dyn InvocationBinder,
    ) -> Result<Option<HubMessage>> {
        match self.frames.try_decode(&input[..], binder)? {
            DecodeOutcome::NotEnoughData => Ok(None),
            DecodeOutcome::Message { message, consumed } => {
                input.advance(consumed);
                Ok(Some(message))
            }
        }
    }

    /// A `tokio_util` codec bound to `binder`, for use with `Framed`
    pub fn codec<B: InvocationBinder + ?Sized>(&self, binder: Arc<B>) -> HubCodec<B> {
        HubCodec::new(self.frames.clone(), binder)
    }
}

impl std::fmt::Debug for HubProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubProtocol")
            .field("name", &self.name)
            .field("version", &PROTOCOL_VERSION)
            .field("max_frame_size", &self.frames.max_frame_size())
            .finish()
    }
}
