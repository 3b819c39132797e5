//! Serialization traits and built-in impls for primitive values.

use wgapi_config::CodecLimits;

use crate::{BinaryWriter, IoError, IoResult, MemoryReader};

/// Represents objects that can be written to and read back from the binary format.
pub trait Serializable {
    /// The size of the object in bytes after serialization.
    fn size(&self) -> usize;

    /// Serializes the object using the specified BinaryWriter.
    fn serialize(&self, writer: &mut BinaryWriter) -> IoResult<()>;

    /// Deserializes the object using the specified MemoryReader.
    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self>
    where
        Self: Sized;
}

/// Extension methods for serializable objects.
pub trait SerializableExt: Serializable {
    /// Converts the object to a byte array.
    fn to_array(&self) -> IoResult<Vec<u8>> {
        let mut writer = BinaryWriter::with_capacity(self.size());
        self.serialize(&mut writer)?;
        Ok(writer.to_bytes())
    }

    /// Creates an object from a byte array using the default limits.
    fn from_array(data: &[u8]) -> IoResult<Self>
    where
        Self: Sized,
    {
        Self::from_array_with_limits(data, CodecLimits::default())
    }

    /// Creates an object from a byte array, rejecting trailing bytes.
    fn from_array_with_limits(data: &[u8], limits: CodecLimits) -> IoResult<Self>
    where
        Self: Sized,
    {
        let mut reader = MemoryReader::with_limits(data, limits);
        let value = Self::deserialize(&mut reader)?;
        if !reader.is_at_end() {
            return Err(IoError::invalid_data(format!(
                "{} trailing bytes after offset {}",
                reader.remaining(),
                reader.position()
            )));
        }
        Ok(value)
    }
}

impl<T: Serializable> SerializableExt for T {}

/// Helper functions for serialization.
pub mod helper {
    use super::Serializable;
    use crate::{BinaryWriter, IoResult, MemoryReader};

    /// Serializes a collection of serializable objects.
    pub fn serialize_array<T: Serializable>(
        items: &[T],
        writer: &mut BinaryWriter,
    ) -> IoResult<()> {
        writer.write_var_int(items.len() as u64);
        for item in items {
            item.serialize(writer)?;
        }
        Ok(())
    }

    /// Deserializes a collection of serializable objects.
    pub fn deserialize_array<T: Serializable>(reader: &mut MemoryReader) -> IoResult<Vec<T>> {
        let count = reader.read_count()?;
        reader.enter_nested()?;
        // capacity is bounded by what the input can actually hold
        let mut items = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            items.push(T::deserialize(reader)?);
        }
        reader.leave_nested();
        Ok(items)
    }

    /// Gets the size of a serialized array.
    pub fn get_array_size<T: Serializable>(items: &[T]) -> usize {
        get_var_size(items.len() as u64) + items.iter().map(Serializable::size).sum::<usize>()
    }

    /// Gets the size of a variable-length integer.
    pub fn get_var_size(value: u64) -> usize {
        if value < 0xFD {
            1
        } else if value <= 0xFFFF {
            3
        } else if value <= 0xFFFF_FFFF {
            5
        } else {
            9
        }
    }

    /// Gets the size of a length-prefixed payload.
    pub fn get_var_bytes_size(len: usize) -> usize {
        get_var_size(len as u64) + len
    }
}

macro_rules! impl_fixed {
    ($ty:ty, $size:expr, $write:ident, $read:ident) => {
        impl Serializable for $ty {
            fn size(&self) -> usize {
                $size
            }

            fn serialize(&self, writer: &mut BinaryWriter) -> IoResult<()> {
                writer.$write(*self);
                Ok(())
            }

            fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
                reader.$read()
            }
        }
    };
}

impl_fixed!(bool, 1, write_bool, read_bool);
impl_fixed!(u8, 1, write_u8, read_u8);
impl_fixed!(u16, 2, write_u16, read_u16);
impl_fixed!(u32, 4, write_u32, read_u32);
impl_fixed!(i32, 4, write_i32, read_i32);
impl_fixed!(u64, 8, write_u64, read_u64);
impl_fixed!(i64, 8, write_i64, read_i64);
impl_fixed!(f64, 8, write_f64, read_f64);

impl Serializable for String {
    fn size(&self) -> usize {
        helper::get_var_bytes_size(self.len())
    }

    fn serialize(&self, writer: &mut BinaryWriter) -> IoResult<()> {
        writer.write_var_string(self);
        Ok(())
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        reader.read_bounded_string()
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    fn size(&self) -> usize {
        helper::get_array_size(self)
    }

    fn serialize(&self, writer: &mut BinaryWriter) -> IoResult<()> {
        helper::serialize_array(self, writer)
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        helper::deserialize_array(reader)
    }
}

impl<T: Serializable> Serializable for Option<T> {
    fn size(&self) -> usize {
        1 + self.as_ref().map_or(0, Serializable::size)
    }

    fn serialize(&self, writer: &mut BinaryWriter) -> IoResult<()> {
        match self {
            Some(value) => {
                writer.write_bool(true);
                value.serialize(writer)
            }
            None => {
                writer.write_bool(false);
                Ok(())
            }
        }
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        if reader.read_bool()? {
            Ok(Some(T::deserialize(reader)?))
        } else {
            Ok(None)
        }
    }
}
