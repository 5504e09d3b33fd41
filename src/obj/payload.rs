//! The `(type, encoding)`-tagged payload carried by every [`super::Obj`].
//!
//! `SPEC_FULL.md` §9 explicitly recommends modeling this as "a variant owning an inline
//! small-buffer-optimized byte array" rather than reproducing the teacher's unsafe tagged
//! pointer (`examples/Diggsey-ijson/src/value.rs`'s `IValue`, which stores a `NonNull<u8>` and
//! recovers type information from low pointer bits). This module follows that guidance: `Payload`
//! is a safe enum, and the legal `(type, encoding)` pairs from `SPEC_FULL.md` §3 fall directly
//! out of which `Payload` variant exists for which `ObjType`.

use std::fmt;

use crate::containers::{CompactList, HashTable, IntSet, LinkedCompactList, SkipList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjType {
    String,
    List,
    Set,
    SortedSet,
    Hash,
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Int,
    InlineString,
    HeapString,
    CompactList,
    LinkedCompactList,
    HashTable,
    IntegerSet,
    SkipList,
    /// Module values carry no encoding tag, per `SPEC_FULL.md` §3.
    Opaque,
}

impl Encoding {
    /// Fixed name set from `SPEC_FULL.md` §4.7's `OBJECT encoding` reply values.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Int => "int",
            Encoding::InlineString => "embstr",
            Encoding::HeapString => "raw",
            Encoding::CompactList => "ziplist",
            Encoding::LinkedCompactList => "quicklist",
            Encoding::HashTable => "hashtable",
            Encoding::IntegerSet => "intset",
            Encoding::SkipList => "skiplist",
            Encoding::Opaque => "unknown",
        }
    }
}

/// A value bound to a Module-typed object. The reference dispatches through a per-module
/// `mem_usage` callback; modeled here as a trait object so embedders can supply their own.
pub trait ModuleValue: fmt::Debug {
    fn mem_usage(&self) -> Option<usize>;
}

// `ModuleValue: fmt::Debug` only guarantees every *concrete* implementor is `Debug`; a trait
// object doesn't inherit that automatically (the same reason `std::error::Error` carries its own
// `impl Debug for dyn Error`), so `Payload`'s derive needs this spelled out explicitly.
impl fmt::Debug for dyn ModuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.mem_usage(), f)
    }
}

#[derive(Debug)]
pub enum Payload {
    /// String × Int: the integer lives directly in the payload, no heap tail.
    StringInt(i64),
    /// String × InlineString: a small owned buffer. Not literally co-allocated with the header
    /// in safe Rust (see `SPEC_FULL.md` §9), but the 44-byte cutoff and external behavior match.
    StringInline(Vec<u8>),
    /// String × HeapString: a separately allocated buffer, possibly with trailing slack.
    StringHeap(Vec<u8>),
    List(ListRepr),
    Set(SetRepr),
    SortedSet(ZsetRepr),
    Hash(HashRepr),
    Module(Box<dyn ModuleValue>),
}

#[derive(Debug)]
pub enum ListRepr {
    Compact(CompactList),
    Linked(LinkedCompactList),
}

#[derive(Debug)]
pub enum SetRepr {
    Hash(HashTable<Vec<u8>, ()>),
    IntSet(IntSet),
}

#[derive(Debug)]
pub enum ZsetRepr {
    Skip(SkipList),
    Compact(CompactList),
}

#[derive(Debug)]
pub enum HashRepr {
    Hash(HashTable<Vec<u8>, Vec<u8>>),
    Compact(CompactList),
}

impl Payload {
    pub fn obj_type(&self) -> ObjType {
        match self {
            Payload::StringInt(_) | Payload::StringInline(_) | Payload::StringHeap(_) => {
                ObjType::String
            }
            Payload::List(_) => ObjType::List,
            Payload::Set(_) => ObjType::Set,
            Payload::SortedSet(_) => ObjType::SortedSet,
            Payload::Hash(_) => ObjType::Hash,
            Payload::Module(_) => ObjType::Module,
        }
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Payload::StringInt(_) => Encoding::Int,
            Payload::StringInline(_) => Encoding::InlineString,
            Payload::StringHeap(_) => Encoding::HeapString,
            Payload::List(ListRepr::Compact(_)) => Encoding::CompactList,
            Payload::List(ListRepr::Linked(_)) => Encoding::LinkedCompactList,
            Payload::Set(SetRepr::Hash(_)) => Encoding::HashTable,
            Payload::Set(SetRepr::IntSet(_)) => Encoding::IntegerSet,
            Payload::SortedSet(ZsetRepr::Skip(_)) => Encoding::SkipList,
            Payload::SortedSet(ZsetRepr::Compact(_)) => Encoding::CompactList,
            Payload::Hash(HashRepr::Hash(_)) => Encoding::HashTable,
            Payload::Hash(HashRepr::Compact(_)) => Encoding::CompactList,
            Payload::Module(_) => Encoding::Opaque,
        }
    }
}
