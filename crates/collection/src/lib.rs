//! WarGaming API collection
//!
//! [`Collection`] is the ordered key-value container behind the API model
//! objects: insertion-ordered, keyed by integer index or string name, with
//! list-style appends, association-preserving sorts and a versioned binary
//! encoding.
//!
//! ```rust
//! use wgapi_collection::{Collection, Key};
//!
//! let mut tanks = Collection::from(vec![10, 20, 30]);
//! tanks.sort(|a, b| b.cmp(a));
//! assert_eq!(tanks.first(), Some((&Key::Index(2), &30)));
//!
//! tanks.unset(1u64);
//! let bytes = tanks.to_bytes().unwrap();
//! assert_eq!(Collection::<i32>::from_bytes(&bytes).unwrap(), tanks);
//! ```

pub mod codec;
pub mod collection;
pub mod error;
pub mod key;
pub mod value;

pub use codec::{FORMAT_VERSION, MAGIC};
pub use collection::{Collection, IntoIter, Iter, IterMut, Keys, Values};
pub use error::{CollectionError, CollectionResult};
pub use key::{Key, KeyRef};
pub use value::Value;
