//! # Geometry Value Types
//!
//! Two- and three-component float vectors used for world positions and view
//! rotations. Both have a fixed wire layout: the components as consecutive
//! little-endian IEEE-754 `f32`, with no length prefix.
//!
//! ```text
//! Vector2 = [x: f32][y: f32]            (8 bytes)
//! Vector3 = [x: f32][y: f32][z: f32]    (12 bytes)
//! ```
//!
//! The wire form is a raw bit copy, so NaN payloads and negative zero survive
//! a round trip unchanged. The derived serde impls produce the same bytes under
//! bincode, which keeps vectors nested inside serde payloads byte-compatible
//! with top-level fixed-layout ones.

use crate::core::serialization::FixedLayout;
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component bit patterns, for exact comparisons
    pub fn to_bits(self) -> [u32; 2] {
        [self.x.to_bits(), self.y.to_bits()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component bit patterns, for exact comparisons
    pub fn to_bits(self) -> [u32; 3] {
        [self.x.to_bits(), self.y.to_bits(), self.z.to_bits()]
    }
}

impl FixedLayout for Vector2 {
    const SIZE: usize = 8;

    fn write_to<B: BufMut>(&self, dst: &mut B) {
        dst.put_f32_le(self.x);
        dst.put_f32_le(self.y);
    }

    fn read_from<B: Buf>(src: &mut B) -> Self {
        let x = src.get_f32_le();
        let y = src.get_f32_le();
        Self { x, y }
    }
}

impl FixedLayout for Vector3 {
    const SIZE: usize = 12;

    fn write_to<B: BufMut>(&self, dst: &mut B) {
        dst.put_f32_le(self.x);
        dst.put_f32_le(self.y);
        dst.put_f32_le(self.z);
    }

    fn read_from<B: Buf>(src: &mut B) -> Self {
        let x = src.get_f32_le();
        let y = src.get_f32_le();
        let z = src.get_f32_le();
        Self { x, y, z }
    }
}
