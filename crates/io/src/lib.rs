//! WarGaming API IO
//!
//! Little-endian binary writer and reader, the variable-length integer
//! scheme, and the [`Serializable`] trait used by the collection codec.

mod binary_writer;
mod error;
mod memory_reader;
pub mod serializable;

pub use binary_writer::BinaryWriter;
pub use error::{IoError, IoResult};
pub use memory_reader::MemoryReader;
pub use serializable::{helper, Serializable, SerializableExt};

pub use wgapi_config::CodecLimits;
