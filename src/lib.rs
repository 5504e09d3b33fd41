//! Value object layer for an in-memory key/value store: the polymorphic value representation
//! used as the right-hand side of every key, plus the memory-accounting and introspection
//! machinery built on top of it. See `SPEC_FULL.md` for the full component design.

pub mod commands;
pub mod containers;
pub mod error;
pub mod eviction;
pub mod factory;
pub mod keyspace;
pub mod memory;
pub mod obj;
pub mod refcount;
pub mod reply;
pub mod size;
pub mod string_accessors;
pub mod string_encoding;

pub use error::{Error, Result};
pub use eviction::{Config, EvictionMode};
pub use obj::{Encoding, Obj, ObjType, RefCount};
