//! Binary and serde encodings of [`Collection`].
//!
//! The top-level binary layout is
//!
//! ```text
//! magic    "WGC1"
//! version  u8
//! open     bool      whether an auto-increment index is left
//! next     var-int   auto-increment index, present only when open
//! count    var-int
//! entries  count x (key, value)
//! ```
//!
//! Nested collections (for example inside [`Value::Map`](crate::Value::Map))
//! carry only the `open`/`next`/`count`/`entries` body.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::de::{Error as _, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use wgapi_config::CodecLimits;
use wgapi_io::{helper, BinaryWriter, IoError, IoResult, MemoryReader, Serializable};

use crate::{Collection, CollectionResult, Key};

/// Leading bytes of every top-level encoding.
pub const MAGIC: [u8; 4] = *b"WGC1";
/// Current encoding version.
pub const FORMAT_VERSION: u8 = 1;

impl<V: Serializable> Serializable for Collection<V> {
    fn size(&self) -> usize {
        1 + self.next_index.map_or(0, helper::get_var_size)
            + helper::get_var_size(self.storage.len() as u64)
            + self
                .storage
                .iter()
                .map(|(key, value)| key.size() + value.size())
                .sum::<usize>()
    }

    fn serialize(&self, writer: &mut BinaryWriter) -> IoResult<()> {
        writer.write_bool(self.next_index.is_some());
        if let Some(next) = self.next_index {
            writer.write_var_int(next);
        }
        writer.write_var_int(self.storage.len() as u64);
        for (key, value) in &self.storage {
            Serializable::serialize(key, writer)?;
            value.serialize(writer)?;
        }
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        let next_index = if reader.read_bool()? {
            Some(reader.read_var_int(u64::MAX)?)
        } else {
            None
        };
        let count = reader.read_count()?;
        reader.enter_nested()?;

        // every entry needs at least two bytes
        let mut storage = IndexMap::with_capacity(count.min(reader.remaining() / 2));
        let mut max_index = None::<u64>;
        for _ in 0..count {
            let offset = reader.position();
            let key = <Key as Serializable>::deserialize(reader)?;
            let value = V::deserialize(reader)?;
            if let Key::Index(index) = key {
                max_index = max_index.max(Some(index));
            }
            if storage.insert(key.clone(), value).is_some() {
                return Err(IoError::invalid_data(format!(
                    "duplicate key {} at offset {}",
                    key, offset
                )));
            }
        }
        reader.leave_nested();

        if let (Some(next), Some(max)) = (next_index, max_index) {
            if next <= max {
                return Err(IoError::invalid_data(format!(
                    "auto-increment index {} does not exceed stored index {}",
                    next, max
                )));
            }
        }

        Ok(Self {
            storage,
            next_index,
        })
    }
}

impl<V: Serializable> Collection<V> {
    /// Encodes the collection with the magic/version header.
    pub fn to_bytes(&self) -> CollectionResult<Vec<u8>> {
        let mut writer = BinaryWriter::with_capacity(MAGIC.len() + 1 + self.size());
        writer.write_bytes(&MAGIC);
        writer.write_u8(FORMAT_VERSION);
        Serializable::serialize(self, &mut writer)?;
        Ok(writer.to_bytes())
    }

    /// Decodes bytes produced by [`to_bytes`](Self::to_bytes) using the default limits.
    pub fn from_bytes(data: &[u8]) -> CollectionResult<Self> {
        Self::from_bytes_with_limits(data, CodecLimits::default())
    }

    /// Decodes bytes produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    /// Returns [`CollectionError::Deserialization`](crate::CollectionError::Deserialization)
    /// for a bad header, truncated or trailing data, unknown tags, duplicate
    /// keys, or input exceeding `limits`.
    pub fn from_bytes_with_limits(data: &[u8], limits: CodecLimits) -> CollectionResult<Self> {
        decode(data, limits).map_err(|err| {
            tracing::debug!(error = %err, len = data.len(), "collection decode failed");
            err.into()
        })
    }
}

fn decode<V: Serializable>(data: &[u8], limits: CodecLimits) -> IoResult<Collection<V>> {
    let mut reader = MemoryReader::with_limits(data, limits);
    let magic = reader
        .read_memory(MAGIC.len())
        .map_err(|_| IoError::invalid_data("missing collection header"))?;
    if magic != MAGIC {
        return Err(IoError::invalid_data("bad collection magic"));
    }
    let version = reader.read_u8()?;
    if version != FORMAT_VERSION {
        return Err(IoError::invalid_data(format!(
            "unsupported format version {}",
            version
        )));
    }
    let collection = <Collection<V> as Serializable>::deserialize(&mut reader)?;
    if !reader.is_at_end() {
        return Err(IoError::invalid_data(format!(
            "{} trailing bytes after offset {}",
            reader.remaining(),
            reader.position()
        )));
    }
    Ok(collection)
}

// serde: a sequence of [key, value] pairs, so key kinds and order survive
// formats whose maps only allow string keys. The auto-increment index is not
// carried; decoding recomputes it from the keys.
impl<V: Serialize> Serialize for Collection<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.storage.len()))?;
        for entry in &self.storage {
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }
}

struct CollectionVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for CollectionVisitor<V> {
    type Value = Collection<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a sequence of [key, value] pairs")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut collection = Collection::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some((key, value)) = seq.next_element::<(Key, V)>()? {
            if collection.has(&key) {
                return Err(A::Error::custom(format_args!("duplicate key {}", key)));
            }
            collection.insert(key, value);
        }
        Ok(collection)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Collection<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(CollectionVisitor(PhantomData))
    }
}
