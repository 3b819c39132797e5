//! Collection keys: a non-negative integer index or a string name.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::Equivalent;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use wgapi_io::{helper, BinaryWriter, IoError, IoResult, MemoryReader, Serializable};

const TAG_INDEX: u8 = 0;
const TAG_NAME: u8 = 1;

/// Owned collection key.
///
/// Indexes order before names; indexes compare numerically and names
/// lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    Index(u64),
    Name(String),
}

/// Borrowed form of [`Key`] used for lookups without allocating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRef<'a> {
    Index(u64),
    Name(&'a str),
}

impl Key {
    pub fn as_index(&self) -> Option<u64> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Name(_) => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Index(_) => None,
            Key::Name(name) => Some(name),
        }
    }

    pub fn as_key_ref(&self) -> KeyRef<'_> {
        match self {
            Key::Index(index) => KeyRef::Index(*index),
            Key::Name(name) => KeyRef::Name(name),
        }
    }
}

impl KeyRef<'_> {
    pub fn to_key(self) -> Key {
        match self {
            KeyRef::Index(index) => Key::Index(index),
            KeyRef::Name(name) => Key::Name(name.to_owned()),
        }
    }
}

// Key and KeyRef must hash identically for `Equivalent` lookups.
impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key_ref().hash(state);
    }
}

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            KeyRef::Index(index) => {
                TAG_INDEX.hash(state);
                index.hash(state);
            }
            KeyRef::Name(name) => {
                TAG_NAME.hash(state);
                name.hash(state);
            }
        }
    }
}

impl Equivalent<Key> for KeyRef<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        *self == key.as_key_ref()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_key_ref().fmt(f)
    }
}

impl fmt::Display for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Index(index) => write!(f, "{}", index),
            KeyRef::Name(name) => write!(f, "{:?}", name),
        }
    }
}

macro_rules! impl_index_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Key::Index(value as u64)
                }
            }

            impl From<$ty> for KeyRef<'_> {
                fn from(value: $ty) -> Self {
                    KeyRef::Index(value as u64)
                }
            }
        )*
    };
}

impl_index_from!(u8, u16, u32, u64, usize);

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Name(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Name(value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::Name(value.clone())
    }
}

impl From<&Key> for Key {
    fn from(value: &Key) -> Self {
        value.clone()
    }
}

impl From<KeyRef<'_>> for Key {
    fn from(value: KeyRef<'_>) -> Self {
        value.to_key()
    }
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(value: &'a str) -> Self {
        KeyRef::Name(value)
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    fn from(value: &'a String) -> Self {
        KeyRef::Name(value)
    }
}

impl<'a> From<&'a Key> for KeyRef<'a> {
    fn from(value: &'a Key) -> Self {
        value.as_key_ref()
    }
}

impl Serializable for Key {
    fn size(&self) -> usize {
        1 + match self {
            Key::Index(index) => helper::get_var_size(*index),
            Key::Name(name) => helper::get_var_bytes_size(name.len()),
        }
    }

    fn serialize(&self, writer: &mut BinaryWriter) -> IoResult<()> {
        match self {
            Key::Index(index) => {
                writer.write_u8(TAG_INDEX);
                writer.write_var_int(*index);
            }
            Key::Name(name) => {
                writer.write_u8(TAG_NAME);
                writer.write_var_string(name);
            }
        }
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        match reader.read_u8()? {
            TAG_INDEX => Ok(Key::Index(reader.read_var_int(u64::MAX)?)),
            TAG_NAME => Ok(Key::Name(reader.read_bounded_string()?)),
            tag => Err(IoError::invalid_data(format!("unknown key tag {tag:#04x}"))),
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Key::Index(index) => serializer.serialize_u64(*index),
            Key::Name(name) => serializer.serialize_str(name),
        }
    }
}

struct KeyVisitor;

impl<'de> Visitor<'de> for KeyVisitor {
    type Value = Key;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or a string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Key, E> {
        Ok(Key::Index(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Key, E> {
        u64::try_from(value)
            .map(Key::Index)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Key, E> {
        Ok(Key::Name(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Key, E> {
        Ok(Key::Name(value))
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(KeyVisitor)
    }
}
