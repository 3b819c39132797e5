//! Dynamic values for heterogeneous collections.

use serde::{Deserialize, Serialize};

use wgapi_io::{helper, BinaryWriter, IoError, IoResult, MemoryReader, Serializable};

use crate::{Collection, CollectionError, CollectionResult, Key};

/// Tagged value stored in a `Collection<Value>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Collection<Value>),
}

impl Value {
    const TAG_NULL: u8 = 0;
    const TAG_BOOL: u8 = 1;
    const TAG_INT: u8 = 2;
    const TAG_FLOAT: u8 = 3;
    const TAG_STRING: u8 = 4;
    const TAG_BYTES: u8 = 5;
    const TAG_LIST: u8 = 6;
    const TAG_MAP: u8 = 7;

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Whether the value can feed `try_merge` / `try_append`.
    pub fn is_iterable(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Collection<Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

fn not_iterable(value: &Value) -> CollectionError {
    CollectionError::invalid_argument(format!(
        "Invalid data. Must be a list or map, but \"{}\" given.",
        value.type_name()
    ))
}

impl Collection<Value> {
    /// Merges a dynamic value: a map key-wise, a list by position.
    ///
    /// # Errors
    /// Returns [`CollectionError::InvalidArgument`] for scalar input; the
    /// collection is left untouched.
    pub fn try_merge(&mut self, data: Value) -> CollectionResult<&mut Self> {
        match data {
            Value::Map(map) => Ok(self.merge(map)),
            Value::List(items) => Ok(self.merge(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| (Key::from(index), value)),
            )),
            other => {
                let err = not_iterable(&other);
                tracing::debug!(error = %err, "merge rejected");
                Err(err)
            }
        }
    }

    /// Appends the values of a list or map, discarding map keys.
    ///
    /// # Errors
    /// Returns [`CollectionError::InvalidArgument`] for scalar input and
    /// [`CollectionError::IndexExhausted`] when the values do not fit; the
    /// collection is left untouched either way.
    pub fn try_append(&mut self, data: Value) -> CollectionResult<&mut Self> {
        match data {
            Value::List(items) => self.append(items),
            Value::Map(map) => self.append(map.into_iter().map(|(_, value)| value)),
            other => {
                let err = not_iterable(&other);
                tracing::debug!(error = %err, "append rejected");
                Err(err)
            }
        }
    }
}

impl Serializable for Value {
    fn size(&self) -> usize {
        1 + match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 8,
            Value::String(value) => value.size(),
            Value::Bytes(value) => helper::get_var_bytes_size(value.len()),
            Value::List(items) => items.size(),
            Value::Map(map) => map.size(),
        }
    }

    fn serialize(&self, writer: &mut BinaryWriter) -> IoResult<()> {
        match self {
            Value::Null => writer.write_u8(Self::TAG_NULL),
            Value::Bool(value) => {
                writer.write_u8(Self::TAG_BOOL);
                writer.write_bool(*value);
            }
            Value::Int(value) => {
                writer.write_u8(Self::TAG_INT);
                writer.write_i64(*value);
            }
            Value::Float(value) => {
                writer.write_u8(Self::TAG_FLOAT);
                writer.write_f64(*value);
            }
            Value::String(value) => {
                writer.write_u8(Self::TAG_STRING);
                writer.write_var_string(value);
            }
            Value::Bytes(value) => {
                writer.write_u8(Self::TAG_BYTES);
                writer.write_var_bytes(value);
            }
            Value::List(items) => {
                writer.write_u8(Self::TAG_LIST);
                return Serializable::serialize(items, writer);
            }
            Value::Map(map) => {
                writer.write_u8(Self::TAG_MAP);
                return Serializable::serialize(map, writer);
            }
        }
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        let value = match reader.read_u8()? {
            Self::TAG_NULL => Value::Null,
            Self::TAG_BOOL => Value::Bool(reader.read_bool()?),
            Self::TAG_INT => Value::Int(reader.read_i64()?),
            Self::TAG_FLOAT => Value::Float(reader.read_f64()?),
            Self::TAG_STRING => Value::String(reader.read_bounded_string()?),
            Self::TAG_BYTES => Value::Bytes(reader.read_bounded_memory()?.to_vec()),
            Self::TAG_LIST => Value::List(<Vec<Value> as Serializable>::deserialize(reader)?),
            Self::TAG_MAP => Value::Map(<Collection<Value> as Serializable>::deserialize(reader)?),
            tag => {
                return Err(IoError::invalid_data(format!(
                    "unknown value tag {tag:#04x}"
                )))
            }
        };
        Ok(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Collection<Value>> for Value {
    fn from(value: Collection<Value>) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgapi_io::SerializableExt;

    fn vehicle() -> Collection<Value> {
        let mut map = Collection::new();
        map.insert("name", Value::from("T-34"));
        map.insert("tier", Value::from(5));
        map
    }

    #[test]
    fn test_try_merge_map_overwrites() {
        let mut collection = vehicle();
        let mut update = Collection::new();
        update.insert("tier", Value::from(6));
        update.insert("premium", Value::from(false));

        collection.try_merge(Value::Map(update)).unwrap();
        assert_eq!(collection.get("tier").unwrap(), &Value::Int(6));
        assert_eq!(collection.get("name").unwrap(), &Value::from("T-34"));
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_try_merge_list_uses_positions() {
        let mut collection = Collection::from(vec![Value::from(1), Value::from(2), Value::from(3)]);
        collection
            .try_merge(Value::List(vec![Value::from(10), Value::from(20)]))
            .unwrap();
        let values: Vec<_> = collection.values().filter_map(Value::as_int).collect();
        assert_eq!(values, vec![10, 20, 3]);
    }

    #[test]
    fn test_scalar_rejected_without_mutation() {
        let mut collection = vehicle();
        let before = collection.clone();

        let err = collection.try_merge(Value::Int(42)).unwrap_err();
        assert_eq!(
            err,
            CollectionError::InvalidArgument(
                "Invalid data. Must be a list or map, but \"int\" given.".into()
            )
        );
        assert!(collection.try_append(Value::from("text")).is_err());
        assert_eq!(collection, before);
    }

    #[test]
    fn test_try_append_map_discards_keys() {
        let mut collection = Collection::new();
        collection.try_append(Value::Map(vehicle())).unwrap();
        assert_eq!(collection.get(0u64).unwrap(), &Value::from("T-34"));
        assert_eq!(collection.get(1u64).unwrap(), &Value::Int(5));
        assert!(!collection.has("name"));
    }

    #[test]
    fn test_accessors() {
        let map = Value::Map(vehicle());
        assert_eq!(map.as_map().map(Collection::len), Some(2));
        assert!(map.as_list().is_none());

        let list = Value::List(vec![Value::Null, Value::Bool(true)]);
        let items = list.as_list().unwrap();
        assert!(items[0].is_null());
        assert_eq!(items[1].as_bool(), Some(true));
        assert_eq!(items[1].as_int(), None);

        assert_eq!(Value::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::from("x").as_float(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert!(!Value::Bool(false).is_null());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn test_nested_roundtrip() {
        let mut root = Collection::new();
        root.insert("vehicle", Value::Map(vehicle()));
        root.insert("tags", Value::List(vec![Value::from("heavy"), Value::Null]));
        root.insert("blob", Value::Bytes(vec![0, 1, 2]));
        root.insert("ratio", Value::Float(0.25));
        let value = Value::Map(root);

        let bytes = value.to_array().unwrap();
        assert_eq!(bytes.len(), value.size());
        assert_eq!(Value::from_array(&bytes).unwrap(), value);
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(
            Value::from_array(&[0x42]),
            Err(IoError::InvalidData(_))
        ));
    }
}
