//! Field-level wire primitives shared by every message kind.
//!
//! All integers are little-endian.
//!
//! ```text
//! string  = i32(len) bytes[len]      ; len == -1 => null
//! payload = u32(byteLen) bytes[byteLen]
//! bool    = u8                       ; 0 => false, anything else => true
//! ```
//!
//! Readers operate on one frame body that the frame codec has already
//! delimited, so running short here means the frame is inconsistent and is
//! reported as [`ProtocolError::Truncated`], never as "not enough data".

use crate::core::serialization::{Payload, PayloadSerializer, PayloadType};
use crate::error::{ProtocolError, Result};
use bytes::BufMut;

/// Length value that marks a null string
pub const NULL_STRING_LENGTH: i32 = -1;

/// Write a nullable length-prefixed UTF-8 string.
pub fn put_string<B: BufMut>(dst: &mut B, value: Option<&str>) {
    match value {
        None => dst.put_i32_le(NULL_STRING_LENGTH),
        Some(s) => {
            dst.put_i32_le(s.len() as i32);
            dst.put_slice(s.as_bytes());
        }
    }
}

pub fn put_bool<B: BufMut>(dst: &mut B, value: bool) {
    dst.put_u8(u8::from(value));
}

/// Serialize a payload and write it behind its own byte-count prefix.
pub fn put_payload<B: BufMut>(
    dst: &mut B,
    serializer: &dyn PayloadSerializer,
    value: &Payload,
) -> Result<()> {
    let bytes = serializer.serialize(value)?;
    dst.put_u32_le(bytes.len() as u32);
    dst.put_slice(&bytes);
    Ok(())
}

/// Write an element count followed by each payload.
pub fn put_payloads<B: BufMut>(
    dst: &mut B,
    serializer: &dyn PayloadSerializer,
    values: &[Payload],
) -> Result<()> {
    dst.put_i32_le(values.len() as i32);
    for value in values {
        put_payload(dst, serializer, value)?;
    }
    Ok(())
}

/// Cursor over a single frame body.
#[derive(Debug)]
pub struct BodyReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BodyReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(ProtocolError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.take(1)?[0] != 0)
    }

    /// Read a nullable string; `None` for the null sentinel.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let len = self.read_i32()?;
        if len == NULL_STRING_LENGTH {
            return Ok(None);
        }
        if len < 0 {
            return Err(ProtocolError::InvalidLength(len));
        }
        let bytes = self.take(len as usize)?;
        Ok(Some(std::str::from_utf8(bytes)?.to_owned()))
    }

    /// Read a string that must not be null.
    pub fn read_required_string(&mut self, field: &'static str) -> Result<String> {
        self.read_string()?.ok_or(ProtocolError::UnexpectedNull(field))
    }

    /// Read the raw bytes of one length-prefixed payload.
    pub fn read_payload_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(ProtocolError::InvalidLength(len));
        }
        self.take(len as usize)
    }

    pub fn read_payload(
        &mut self,
        serializer: &dyn PayloadSerializer,
        ty: PayloadType,
    ) -> Result<Payload> {
        let bytes = self.read_payload_bytes()?;
        serializer.deserialize(bytes, ty)
    }

    /// Read a payload array; `types` gives the element types in order.
    ///
    /// `on_excess` is called when the frame carries more elements than there
    /// are types, with the declared element count.
    pub fn read_payloads<F>(
        &mut self,
        serializer: &dyn PayloadSerializer,
        types: &[PayloadType],
        on_excess: F,
    ) -> Result<Vec<Payload>>
    where
        F: FnOnce(usize) -> ProtocolError,
    {
        let count = self.read_i32()?;
        if count < 0 {
            return Err(ProtocolError::InvalidLength(count));
        }
        let count = count as usize;
        if count > types.len() {
            return Err(on_excess(count));
        }
        // Each element carries at least its 4-byte prefix
        if count.saturating_mul(4) > self.remaining() {
            return Err(ProtocolError::Truncated {
                needed: count * 4,
                remaining: self.remaining(),
            });
        }

        let mut values = Vec::with_capacity(count);
        for ty in &types[..count] {
            values.push(self.read_payload(serializer, *ty)?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_null_and_empty_strings_are_distinct() {
        let mut buf = BytesMut::new();
        put_string(&mut buf, None);
        put_string(&mut buf, Some(""));
        assert_eq!(&buf[..], &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);

        let mut reader = BodyReader::new(&buf);
        assert_eq!(reader.read_string().unwrap(), None);
        assert_eq!(reader.read_string().unwrap(), Some(String::new()));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_string_utf8_roundtrip() {
        let mut buf = BytesMut::new();
        put_string(&mut buf, Some("радар"));

        let mut reader = BodyReader::new(&buf);
        assert_eq!(reader.read_string().unwrap().as_deref(), Some("радар"));
    }

    #[test]
    fn test_string_longer_than_body_is_truncated() {
        let mut buf = BytesMut::new();
        buf.put_i32_le(10);
        buf.put_slice(b"abc");

        let err = BodyReader::new(&buf).read_string().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Truncated {
                needed: 10,
                remaining: 3
            }
        ));
    }

    #[test]
    fn test_negative_string_length_rejected() {
        let mut buf = BytesMut::new();
        buf.put_i32_le(-2);

        let err = BodyReader::new(&buf).read_string().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidLength(-2)));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut buf = BytesMut::new();
        buf.put_i32_le(2);
        buf.put_slice(&[0xC3, 0x28]);

        let err = BodyReader::new(&buf).read_string().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidUtf8(_)));
    }

    #[test]
    fn test_required_string_rejects_null() {
        let mut buf = BytesMut::new();
        put_string(&mut buf, None);

        let err = BodyReader::new(&buf)
            .read_required_string("target")
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedNull("target")));
    }

    #[test]
    fn test_bool_nonzero_is_true() {
        let buf = [0u8, 1, 0x7F];
        let mut reader = BodyReader::new(&buf);
        assert!(!reader.read_bool().unwrap());
        assert!(reader.read_bool().unwrap());
        assert!(reader.read_bool().unwrap());
        assert!(reader.read_bool().is_err());
    }

    #[test]
    fn test_payload_bytes_are_length_delimited() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(3);
        buf.put_slice(&[9, 8, 7]);
        buf.put_u32_le(0);

        let mut reader = BodyReader::new(&buf);
        assert_eq!(reader.read_payload_bytes().unwrap(), &[9, 8, 7]);
        assert!(reader.read_payload_bytes().unwrap().is_empty());
        assert_eq!(reader.position(), buf.len());
    }
}
