//! # Payload Serialization
//!
//! The frame codec never serializes application values itself. It hands every
//! argument, stream item and completion result to a [`PayloadSerializer`] and
//! wraps whatever bytes come back in its own length prefix, so the payload
//! format can change without touching the framing.
//!
//! ## Registry
//! [`PayloadRegistry`] is the default serializer: an explicit map from a
//! static type identifier ([`PayloadType`]) to a pair of monomorphized
//! encode/decode functions. Two kinds of entries exist:
//! - **Serde** types, encoded with `bincode` (little-endian, fixed-width ints)
//! - **Fixed-layout** types implementing [`FixedLayout`], written raw with a
//!   statically known size and no inner length prefix
//!
//! ## Initialization
//! The process-wide registry is created once by [`init`] (or lazily by
//! [`PayloadRegistry::global`]) and lives for the rest of the process. It must
//! exist before the first encode/decode; afterwards it is only read, apart
//! from optional extra registrations by the host.
//!
//! ```rust
//! use radar_hub_protocol::core::serialization::{Payload, PayloadSerializer, PayloadType};
//! use radar_hub_protocol::core::geometry::Vector3;
//!
//! let registry = radar_hub_protocol::core::serialization::init();
//! let value = Payload::new(Vector3::new(1.0, 2.0, 3.0));
//! let bytes = registry.serialize(&value).unwrap();
//! assert_eq!(bytes.len(), 12);
//!
//! let back = registry.deserialize(&bytes, PayloadType::of::<Vector3>()).unwrap();
//! assert_eq!(back, value);
//! ```

use crate::core::geometry::{Vector2, Vector3};
use crate::error::constants::{ERR_REGISTRY_READ_LOCK, ERR_REGISTRY_WRITE_LOCK};
use crate::error::{ProtocolError, Result};
use crate::radar::{PlayerCategory, RadarPlayer, RadarUpdate};
use bincode::Options;
use bytes::{Buf, BufMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

/// Serialization capability consumed by the frame codec.
///
/// Implementations must be pure with respect to the value: the same payload
/// always yields the same bytes.
pub trait PayloadSerializer: Send + Sync {
    /// Serialize a payload using its own [`PayloadType`]
    fn serialize(&self, value: &Payload) -> Result<Vec<u8>>;

    /// Deserialize exactly `bytes` into a value of type `ty`
    fn deserialize(&self, bytes: &[u8], ty: PayloadType) -> Result<Payload>;
}

/// Static identifier of a payload type.
#[derive(Clone, Copy)]
pub struct PayloadType {
    id: TypeId,
    name: &'static str,
}

impl PayloadType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for PayloadType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PayloadType {}

impl Hash for PayloadType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Object-safe view of a payload value. Equality and `Debug` are forwarded to
/// the concrete type so messages can be compared after a round trip.
trait ErasedValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_erased(&self, other: &dyn ErasedValue) -> bool;
}

impl<T> ErasedValue for T
where
    T: Any + fmt::Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_erased(&self, other: &dyn ErasedValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// A type-erased application value carried inside a message.
///
/// Cloning is cheap; the value itself is shared.
#[derive(Clone)]
pub struct Payload {
    ty: PayloadType,
    value: Arc<dyn ErasedValue>,
}

impl Payload {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + fmt::Debug + PartialEq + Send + Sync,
    {
        Self {
            ty: PayloadType::of::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn payload_type(&self) -> PayloadType {
        self.ty
    }

    pub fn is<T: Any>(&self) -> bool {
        self.ty.id == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).as_any().downcast_ref::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        (*self.value).as_any()
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && (*self.value).eq_erased(&*other.value)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.value, f)
    }
}

/// A value type with a statically known wire size, written without any inner
/// length prefix.
pub trait FixedLayout: Sized {
    /// Exact encoded size in bytes
    const SIZE: usize;

    fn write_to<B: BufMut>(&self, dst: &mut B);

    /// Read one value; `src` is guaranteed to hold at least `SIZE` bytes
    fn read_from<B: Buf>(src: &mut B) -> Self;
}

/// How a registered type is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Exactly this many raw bytes
    Fixed(usize),
    /// Variable length, produced by bincode
    Serde,
}

/// Fixed-width little-endian integers, and the payload must be consumed
/// exactly
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

type EncodeFn = fn(&dyn Any, &mut Vec<u8>) -> Result<()>;
type DecodeFn = fn(&[u8]) -> Result<Payload>;

#[derive(Clone, Copy)]
struct Entry {
    layout: Layout,
    encode: EncodeFn,
    decode: DecodeFn,
}

impl Entry {
    fn serde<T>() -> Self
    where
        T: Serialize + DeserializeOwned + Any + fmt::Debug + PartialEq + Send + Sync,
    {
        Entry {
            layout: Layout::Serde,
            encode: encode_serde::<T>,
            decode: decode_serde::<T>,
        }
    }

    fn fixed<T>() -> Self
    where
        T: FixedLayout + Any + fmt::Debug + PartialEq + Send + Sync,
    {
        Entry {
            layout: Layout::Fixed(T::SIZE),
            encode: encode_fixed::<T>,
            decode: decode_fixed::<T>,
        }
    }
}

fn encode_serde<T>(value: &dyn Any, out: &mut Vec<u8>) -> Result<()>
where
    T: Serialize + Any,
{
    let value = value
        .downcast_ref::<T>()
        .ok_or(ProtocolError::UnregisteredType(type_name::<T>()))?;
    bincode_options().serialize_into(out, value)?;
    Ok(())
}

fn decode_serde<T>(bytes: &[u8]) -> Result<Payload>
where
    T: DeserializeOwned + Any + fmt::Debug + PartialEq + Send + Sync,
{
    let value: T = bincode_options().deserialize(bytes)?;
    Ok(Payload::new(value))
}

fn encode_fixed<T>(value: &dyn Any, out: &mut Vec<u8>) -> Result<()>
where
    T: FixedLayout + Any,
{
    let value = value
        .downcast_ref::<T>()
        .ok_or(ProtocolError::UnregisteredType(type_name::<T>()))?;
    out.reserve(T::SIZE);
    value.write_to(out);
    Ok(())
}

fn decode_fixed<T>(mut bytes: &[u8]) -> Result<Payload>
where
    T: FixedLayout + Any + fmt::Debug + PartialEq + Send + Sync,
{
    if bytes.len() != T::SIZE {
        return Err(ProtocolError::FixedLayoutSize {
            type_name: type_name::<T>(),
            expected: T::SIZE,
            actual: bytes.len(),
        });
    }
    Ok(Payload::new(T::read_from(&mut bytes)))
}

/// Registry-backed [`PayloadSerializer`].
pub struct PayloadRegistry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl Default for PayloadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding the geometry formatters, the radar schema
    /// and common primitives
    pub fn with_defaults() -> Self {
        let defaults = [
            (PayloadType::of::<Vector2>(), Entry::fixed::<Vector2>()),
            (PayloadType::of::<Vector3>(), Entry::fixed::<Vector3>()),
            (PayloadType::of::<RadarUpdate>(), Entry::serde::<RadarUpdate>()),
            (PayloadType::of::<RadarPlayer>(), Entry::serde::<RadarPlayer>()),
            (PayloadType::of::<PlayerCategory>(), Entry::serde::<PlayerCategory>()),
            (PayloadType::of::<bool>(), Entry::serde::<bool>()),
            (PayloadType::of::<i32>(), Entry::serde::<i32>()),
            (PayloadType::of::<i64>(), Entry::serde::<i64>()),
            (PayloadType::of::<u32>(), Entry::serde::<u32>()),
            (PayloadType::of::<u64>(), Entry::serde::<u64>()),
            (PayloadType::of::<f32>(), Entry::serde::<f32>()),
            (PayloadType::of::<f64>(), Entry::serde::<f64>()),
            (PayloadType::of::<String>(), Entry::serde::<String>()),
        ];
        let entries = defaults
            .into_iter()
            .map(|(ty, entry)| (ty.id, entry))
            .collect::<HashMap<_, _>>();

        Self {
            entries: RwLock::new(entries),
        }
    }

    /// The process-wide registry, created on first use
    pub fn global() -> Arc<PayloadRegistry> {
        init().clone()
    }

    /// Register a serde type. Registering a type twice is a no-op.
    pub fn register<T>(&self) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Any + fmt::Debug + PartialEq + Send + Sync,
    {
        self.insert::<T>(Entry::serde::<T>())
    }

    /// Register a fixed-layout type. Registering a type twice is a no-op.
    pub fn register_fixed<T>(&self) -> Result<()>
    where
        T: FixedLayout + Any + fmt::Debug + PartialEq + Send + Sync,
    {
        self.insert::<T>(Entry::fixed::<T>())
    }

    fn insert<T: Any>(&self, entry: Entry) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ProtocolError::LockPoisoned(ERR_REGISTRY_WRITE_LOCK))?;

        if entries.contains_key(&TypeId::of::<T>()) {
            return Ok(());
        }
        entries.insert(TypeId::of::<T>(), entry);
        debug!(payload_type = type_name::<T>(), layout = ?entry.layout, "Registered payload type");
        Ok(())
    }

    fn entry(&self, ty: PayloadType) -> Result<Entry> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ProtocolError::LockPoisoned(ERR_REGISTRY_READ_LOCK))?;

        entries
            .get(&ty.id)
            .copied()
            .ok_or(ProtocolError::UnregisteredType(ty.name))
    }

    /// Layout of a registered type, `None` if unknown
    pub fn layout(&self, ty: PayloadType) -> Option<Layout> {
        self.entry(ty).ok().map(|entry| entry.layout)
    }

    pub fn is_registered<T: Any>(&self) -> bool {
        self.layout(PayloadType::of::<T>()).is_some()
    }

    /// Number of registered types
    pub fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ProtocolError::LockPoisoned(ERR_REGISTRY_READ_LOCK))?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl PayloadSerializer for PayloadRegistry {
    fn serialize(&self, value: &Payload) -> Result<Vec<u8>> {
        let entry = self.entry(value.payload_type())?;
        let mut out = match entry.layout {
            Layout::Fixed(size) => Vec::with_capacity(size),
            Layout::Serde => Vec::new(),
        };
        (entry.encode)(value.as_any(), &mut out)?;
        Ok(out)
    }

    fn deserialize(&self, bytes: &[u8], ty: PayloadType) -> Result<Payload> {
        let entry = self.entry(ty)?;
        (entry.decode)(bytes)
    }
}

static GLOBAL_REGISTRY: OnceLock<Arc<PayloadRegistry>> = OnceLock::new();

/// Build the process-wide registry (idempotent). Call once at startup before
/// any encode/decode.
pub fn init() -> &'static Arc<PayloadRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| {
        let registry = PayloadRegistry::with_defaults();
        debug!(types = registry.len().ok(), "Payload registry initialized");
        Arc::new(registry)
    })
}
