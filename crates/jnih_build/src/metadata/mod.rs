//! Class metadata extraction.
//!
//! The reader performs one bounded pass over class file bytes and produces a
//! [`ClassMetadata`] record; the cache keeps parsed records for the duration
//! of a generator run so superclass walks never re-parse a class.

mod cache;
mod classfile;
mod model;

pub use cache::MetadataCache;
pub use classfile::{parse_class, ClassParseError};
pub use model::{ClassMetadata, ConstantField, ConstantValue, NativeMethod};
