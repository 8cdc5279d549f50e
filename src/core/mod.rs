//! # Core Protocol Components
//!
//! Framing, the payload serializer, and the primitive wire encodings.
//!
//! ## Components
//! - **Codec**: Frame encoder/decoder and the Tokio codec adapter
//! - **Serialization**: Type-erased payloads and the formatter registry
//! - **Wire**: Length-prefixed strings, flags, and nested payload blocks
//! - **Geometry**: Fixed-layout vector types
//!
//! ## Wire Format
//! ```text
//! [Length(4, u32 LE)] [MessageType(4, i32 LE)] [Body(Length - 4)]
//! ```
//!
//! ## Security
//! - Maximum frame size: 16MB by default (prevents memory exhaustion)
//! - Length validation before any body parsing

pub mod codec;
pub mod geometry;
pub mod serialization;
pub mod wire;
