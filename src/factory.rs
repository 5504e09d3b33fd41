//! Value object construction (`SPEC_FULL.md` §4.1), grounded on
//! `examples/original_source/src/object.c`'s `createStringObject`,
//! `createEmbeddedStringObject`, `createStringObjectFromLongLongWithOptions` and the shared
//! small-integer pool it builds at startup (`createSharedObjects`). The pool's "return the
//! canonical instance for this value" shape mirrors `examples/Diggsey-ijson/src/string.rs`'s
//! `IString::intern`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::containers::{CompactList, HashTable, IntSet, LinkedCompactList, SkipList};
use crate::error::{self, Result};
use crate::eviction::{AccessMeta, Config};
use crate::obj::payload::{HashRepr, ListRepr, SetRepr, ZsetRepr};
use crate::obj::{ModuleValue, Obj, ObjCell, Payload};
use crate::refcount;

/// Byte length at or below which a String is stored inline rather than on the heap. Chosen, per
/// the reference, so header + buffer fit a 64-byte allocator bin.
pub const INLINE_MAX: usize = 44;

/// Size of the shared small-integer pool.
pub const SHARED_INT_COUNT: i64 = 10_000;

thread_local! {
    static SHARED_INTS: RefCell<Option<Vec<Obj>>> = RefCell::new(None);
}

fn with_shared_pool<R>(now_ticks: u32, mode: crate::eviction::EvictionMode, f: impl FnOnce(&[Obj]) -> R) -> R {
    SHARED_INTS.with(|cell| {
        let mut guard = cell.borrow_mut();
        if guard.is_none() {
            let mut pool = Vec::with_capacity(SHARED_INT_COUNT as usize);
            for v in 0..SHARED_INT_COUNT {
                let meta = AccessMeta::initial(mode, now_ticks);
                let o = ObjCell::new(Payload::StringInt(v), meta);
                refcount::make_immortal(&o).expect("fresh object has refcount 1");
                pool.push(o);
            }
            log::debug!("initialized shared small-integer pool ({} entries)", pool.len());
            *guard = Some(pool);
        }
        f(guard.as_ref().unwrap())
    })
}

/// `createStringObject`/`createEmbeddedStringObject`-dispatch: inline if the buffer fits,
/// heap otherwise.
pub fn new_string(bytes: &[u8], config: &Config, now_ticks: u32) -> Obj {
    if bytes.len() <= INLINE_MAX {
        new_string_inline(bytes, config, now_ticks)
    } else {
        new_string_raw(bytes, config, now_ticks)
    }
}

pub fn new_string_raw(bytes: &[u8], config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::StringHeap(bytes.to_vec()), meta)
}

pub fn new_string_inline(bytes: &[u8], config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::StringInline(bytes.to_vec()), meta)
}

/// `createStringObjectFromLongLongWithOptions`: serves the shared pool when allowed, otherwise
/// builds an Int-encoded object when the value fits an `i64`, otherwise a HeapString with the
/// decimal representation.
pub fn new_string_from_int(v: i128, config: &Config, now_ticks: u32) -> Obj {
    if config.shared_integers_allowed && (0..SHARED_INT_COUNT as i128).contains(&v) {
        log::debug!("new_string_from_int: shared-pool hit for {v}");
        return with_shared_pool(now_ticks, config.eviction_mode, |pool| {
            Rc::clone(&pool[v as usize])
        });
    }
    log::debug!("new_string_from_int: shared-pool miss for {v}");
    if let Ok(v64) = i64::try_from(v) {
        let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
        ObjCell::new(Payload::StringInt(v64), meta)
    } else {
        new_string(v.to_string().as_bytes(), config, now_ticks)
    }
}

/// `createStringObjectFromLongDouble`: fixed-trim ("human friendly") or faithful formatting.
///
/// The non-human-friendly branch mirrors `ld2string`'s `%.17Lg`: significant-digit, not
/// fixed-point, formatting. Rust's shortest-round-trip `Display` for `f64` gives the same
/// "enough digits to round-trip, no padding" property without fixing 17 digits after the point.
pub fn new_string_from_float(v: f64, humanfriendly: bool, config: &Config, now_ticks: u32) -> Obj {
    let s = if humanfriendly { format_human_friendly(v) } else { format!("{v}") };
    new_string(s.as_bytes(), config, now_ticks)
}

fn format_human_friendly(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e17 {
        format!("{v:.0}")
    } else {
        let mut s = format!("{v:.17}");
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        s
    }
}

pub fn new_list(config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::List(ListRepr::Compact(CompactList::new())), meta)
}

pub fn new_list_linked(config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::List(ListRepr::Linked(LinkedCompactList::new())), meta)
}

pub fn new_set(config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::Set(SetRepr::Hash(HashTable::new())), meta)
}

pub fn new_intset(config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::Set(SetRepr::IntSet(IntSet::new())), meta)
}

pub fn new_hash(config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::Hash(HashRepr::Hash(HashTable::new())), meta)
}

pub fn new_hash_compact(config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::Hash(HashRepr::Compact(CompactList::new())), meta)
}

pub fn new_zset(config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::SortedSet(ZsetRepr::Skip(SkipList::new())), meta)
}

pub fn new_zset_compact(config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::SortedSet(ZsetRepr::Compact(CompactList::new())), meta)
}

pub fn new_module(value: Box<dyn ModuleValue>, config: &Config, now_ticks: u32) -> Obj {
    let meta = AccessMeta::initial(config.eviction_mode, now_ticks);
    ObjCell::new(Payload::Module(value), meta)
}

/// `dupStringObject`: produces an unshared copy with the same encoding. Duplicating a
/// shared-pool object yields a fresh object with `refcount == 1`, never another pool reference.
pub fn dup_string(o: &Obj) -> Result<Obj> {
    let meta = o.access_meta();
    match &*o.payload() {
        Payload::StringInt(v) => Ok(ObjCell::new(Payload::StringInt(*v), meta)),
        Payload::StringInline(buf) => Ok(ObjCell::new(Payload::StringInline(buf.clone()), meta)),
        Payload::StringHeap(buf) => Ok(ObjCell::new(Payload::StringHeap(buf.clone()), meta)),
        _ => Err(error::Error::fatal("dup_string called on non-String object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::EvictionMode;
    use crate::obj::{Encoding, ObjType, RefCount};

    fn cfg() -> Config {
        Config { eviction_mode: EvictionMode::Recency, shared_integers_allowed: true, default_sample_size: 5 }
    }

    #[test]
    fn short_string_is_inline() {
        let o = new_string(b"hello", &cfg(), 0);
        assert_eq!(o.encoding(), Encoding::InlineString);
    }

    #[test]
    fn long_string_is_heap() {
        let bytes = vec![b'x'; 100];
        let o = new_string(&bytes, &cfg(), 0);
        assert_eq!(o.encoding(), Encoding::HeapString);
    }

    #[test]
    fn boundary_44_is_inline_45_is_heap() {
        let o44 = new_string(&vec![b'a'; 44], &cfg(), 0);
        assert_eq!(o44.encoding(), Encoding::InlineString);
        let o45 = new_string(&vec![b'a'; 45], &cfg(), 0);
        assert_eq!(o45.encoding(), Encoding::HeapString);
    }

    #[test]
    fn shared_pool_is_immortal_and_canonical() {
        let a = new_string_from_int(7, &cfg(), 0);
        let b = new_string_from_int(7, &cfg(), 0);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.refcount(), RefCount::Immortal);
    }

    #[test]
    fn dup_of_shared_pool_is_fresh_and_unshared() {
        let a = new_string_from_int(7, &cfg(), 0);
        let d = dup_string(&a).unwrap();
        assert!(!Rc::ptr_eq(&a, &d));
        assert_eq!(d.refcount(), RefCount::Count(1));
    }

    #[test]
    fn out_of_range_int_falls_back_to_heap_string() {
        let v: i128 = i128::from(i64::MAX) + 1000;
        let o = new_string_from_int(v, &cfg(), 0);
        assert_eq!(o.obj_type(), ObjType::String);
    }
}
