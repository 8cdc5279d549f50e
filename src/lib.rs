//! # Radar Hub Protocol
//!
//! Binary hub protocol for streaming radar snapshots to remote clients.
//!
//! Frames are `[u32 length][i32 message type][body]`, little-endian. Bodies
//! carry invocation ids, method names, and payloads produced by a
//! registry-backed serializer with fixed layouts for vector types.
//!
//! ## Quick Start
//! ```no_run
//! use radar_hub_protocol::{
//!     HubMessage, HubProtocol, Payload, PayloadType, StaticBinder, Vector3,
//! };
//! use bytes::BytesMut;
//!
//! radar_hub_protocol::init();
//!
//! let protocol = HubProtocol::default();
//! let binder = StaticBinder::new();
//! binder.bind_target("MoveTo", vec![PayloadType::of::<Vector3>()])?;
//!
//! let message = HubMessage::Invocation {
//!     invocation_id: None,
//!     target: "MoveTo".into(),
//!     arguments: vec![Payload::new(Vector3::new(1.0, 2.0, 3.0))],
//! };
//! let mut buffer = BytesMut::new();
//! protocol.write_message(&message, &mut buffer)?;
//! let parsed = protocol.try_parse_message(&mut buffer, &binder)?;
//! assert_eq!(parsed, Some(message));
//! # Ok::<(), radar_hub_protocol::ProtocolError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod radar;
pub mod utils;

pub use crate::config::{CodecConfig, LoggingConfig, ProtocolConfig};
pub use crate::core::codec::{DecodeOutcome, FrameCodec, HubCodec};
pub use crate::core::geometry::{Vector2, Vector3};
pub use crate::core::serialization::{
    FixedLayout, Payload, PayloadRegistry, PayloadSerializer, PayloadType,
};
pub use crate::error::{ErrorKind, ProtocolError, Result};
pub use crate::protocol::binder::{InvocationBinder, StaticBinder};
pub use crate::protocol::hub::{HubProtocol, TransferFormat};
pub use crate::protocol::message::{CompletionOutcome, HubMessage, MessageType};
pub use crate::radar::{
    PlayerCategory, PlayerSource, RadarPlayer, RadarUpdate, UpdateSequencer, VersionGate,
};

/// Initialize the global payload registry and metrics.
///
/// Safe to call more than once.
pub fn init() {
    core::serialization::init();
    utils::metrics::init_metrics();
}
