//! String encoding promotion/demotion (`SPEC_FULL.md` §4.3), grounded on
//! `examples/original_source/src/object.c`'s `tryObjectEncodingEx` and `dupStringObject`'s
//! slack-shrink handling (`sdsResize`-equivalent).

use std::rc::Rc;

use crate::error::Result;
use crate::eviction::Config;
use crate::factory::{self, INLINE_MAX};
use crate::obj::{Encoding, Obj, ObjType, Payload};
use crate::refcount;

/// Fraction of buffer slack, relative to content length, that triggers an in-place shrink.
const SLACK_SHRINK_THRESHOLD: f64 = 0.10;

fn string_bytes(payload: &Payload) -> Option<Vec<u8>> {
    match payload {
        Payload::StringInt(v) => Some(v.to_string().into_bytes()),
        Payload::StringInline(b) | Payload::StringHeap(b) => Some(b.clone()),
        _ => None,
    }
}

/// `tryObjectEncodingEx`: returns an object equivalent in value to `o`, possibly the same
/// pointer, possibly a new one (with `o` logically decref'd).
pub fn try_encode(o: Obj, config: &Config, now_ticks: u32) -> Obj {
    if o.obj_type() != ObjType::String {
        return o;
    }
    if o.encoding() == Encoding::Int {
        return o;
    }
    if let crate::obj::RefCount::Count(n) = o.refcount() {
        if n > 1 {
            // Another owner may hold this object; rewriting it would be unsafe.
            return o;
        }
    }

    let bytes = string_bytes(&o.payload()).expect("String object has string payload");

    if bytes.len() <= 20 {
        if let Ok(s) = std::str::from_utf8(&bytes) {
            if let Ok(v) = s.parse::<i64>() {
                // Reject non-canonical forms ("+1", "01", leading/trailing junk already excluded
                // by `parse`), matching the reference's `string2ll` strictness.
                if v.to_string() == s {
                    log::trace!("try_encode: promoting to int encoding ({v})");
                    if config.shared_integers_allowed && (0..factory::SHARED_INT_COUNT).contains(&v) {
                        let shared = factory::new_string_from_int(v as i128, config, now_ticks);
                        refcount::decr(o);
                        return shared;
                    }
                    o.replace_payload(Payload::StringInt(v));
                    return o;
                }
            }
        }
    }

    match o.encoding() {
        Encoding::HeapString => {
            if bytes.len() <= INLINE_MAX {
                log::trace!("try_encode: demoting heap string to inline ({} bytes)", bytes.len());
                let fresh = factory::new_string_inline(&bytes, config, now_ticks);
                refcount::decr(o);
                fresh
            } else {
                let cap = match &*o.payload() {
                    Payload::StringHeap(b) => b.capacity(),
                    _ => bytes.len(),
                };
                let slack = cap.saturating_sub(bytes.len());
                if (slack as f64) > SLACK_SHRINK_THRESHOLD * bytes.len() as f64 {
                    log::trace!("try_encode: shrinking heap string slack ({slack} bytes)");
                    let mut shrunk = bytes;
                    shrunk.shrink_to_fit();
                    o.replace_payload(Payload::StringHeap(shrunk));
                }
                o
            }
        }
        Encoding::InlineString => o,
        _ => o,
    }
}

/// `getDecodedObject`: yields a String-encoded object. Already-string-encoded objects are
/// returned with an extra logical reference; Int-encoded objects are formatted into a brand new
/// object that the caller owns outright.
pub fn decode(o: &Obj, config: &Config, now_ticks: u32) -> Result<Obj> {
    match o.encoding() {
        Encoding::Int => {
            let v = match &*o.payload() {
                Payload::StringInt(v) => *v,
                _ => unreachable!("Int encoding always carries StringInt payload"),
            };
            Ok(factory::new_string(v.to_string().as_bytes(), config, now_ticks))
        }
        Encoding::InlineString | Encoding::HeapString => {
            refcount::incr(o);
            Ok(Rc::clone(o))
        }
        _ => Err(crate::error::Error::fatal("decode called on non-String object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::EvictionMode;
    use crate::factory::new_string;
    use crate::obj::RefCount;
    use crate::string_accessors::to_i64;

    fn cfg() -> Config {
        Config { eviction_mode: EvictionMode::Recency, shared_integers_allowed: true, default_sample_size: 5 }
    }

    #[test]
    fn numeric_string_promotes_to_int() {
        let o = new_string(b"12345", &cfg(), 0);
        let o = try_encode(o, &cfg(), 0);
        assert_eq!(o.encoding(), Encoding::Int);
        assert_eq!(to_i64(&o).unwrap(), 12345);
    }

    #[test]
    fn small_numeric_string_uses_shared_pool() {
        let o = new_string(b"7", &cfg(), 0);
        let o = try_encode(o, &cfg(), 0);
        assert_eq!(o.refcount(), RefCount::Immortal);
    }

    #[test]
    fn non_numeric_string_unaffected() {
        let o = new_string(b"hello", &cfg(), 0);
        let o2 = try_encode(o, &cfg(), 0);
        assert_eq!(o2.encoding(), Encoding::InlineString);
    }

    #[test]
    fn decode_int_produces_string_bytes() {
        let o = new_string(b"42", &cfg(), 0);
        let o = try_encode(o, &cfg(), 0);
        assert_eq!(o.encoding(), Encoding::Int);
        let decoded = decode(&o, &cfg(), 0).unwrap();
        assert!(matches!(decoded.encoding(), Encoding::InlineString | Encoding::HeapString));
    }

    #[test]
    fn shared_refcount_blocks_rewrite() {
        let o = new_string(b"12345", &cfg(), 0);
        crate::refcount::incr(&o);
        let unchanged = try_encode(Rc::clone(&o), &cfg(), 0);
        assert_eq!(unchanged.encoding(), Encoding::InlineString);
    }

    /// Scenario S4: a HeapString with 200 bytes of slack over 1000 bytes of content shrinks to
    /// exactly its content length in place.
    #[test]
    fn heap_string_with_slack_shrinks_in_place_s4() {
        let mut buf = Vec::with_capacity(1200);
        buf.extend(std::iter::repeat(b'x').take(1000));
        let o = factory::new_string_raw(&buf, &cfg(), 0);
        o.replace_payload(Payload::StringHeap(buf));
        assert_eq!(o.encoding(), Encoding::HeapString);

        let o = try_encode(o, &cfg(), 0);
        match &*o.payload() {
            Payload::StringHeap(b) => {
                assert_eq!(b.len(), 1000);
                assert_eq!(b.capacity(), 1000, "slack should be shrunk away entirely");
            }
            other => panic!("expected HeapString payload, got {other:?}"),
        }
    }
}
