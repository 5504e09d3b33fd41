//! Reference counting (`SPEC_FULL.md` §4.2), grounded on `examples/original_source/src/object.c`'s
//! `incrRefCount`/`decrRefCount`/`resetRefCount` and `examples/Diggsey-ijson/src/string.rs`'s
//! manual refcount pattern.

use crate::error::{self, Error, Result};
use crate::obj::{Obj, RefCount};

/// `incrRefCount`: a no-op on an immortal object, otherwise increments the logical counter.
pub fn incr(o: &Obj) {
    match o.refcount() {
        RefCount::Immortal => {}
        RefCount::Count(n) => o.set_refcount(RefCount::Count(n + 1)),
    }
}

/// `decrRefCount`: a no-op on an immortal object. At `refcount == 1` the payload destructor
/// dispatches on type (handled by `Payload`'s own `Drop` glue once the last `Rc` handle to this
/// cell drops) and the header is freed. `refcount <= 0` is a programmer error and is fatal.
///
/// Consumes `o`: the caller is expected to pass the exact handle that represents the logical
/// ownership being released, mirroring the reference's by-value discipline.
pub fn decr(o: Obj) {
    match o.refcount() {
        RefCount::Immortal => {}
        RefCount::Count(1) => {
            log::trace!("decrRefCount: releasing object ({:?}, {:?})", o.obj_type(), o.encoding());
            // `o` drops at the end of this scope; if this is the last `Rc` handle, `Payload`'s
            // `Drop` glue runs here.
        }
        RefCount::Count(n) if n > 1 => o.set_refcount(RefCount::Count(n - 1)),
        RefCount::Count(n) => error::fatal(format!("decrRefCount against refcount of {n}")),
    }
}

/// `resetRefCount`: sets the logical counter to the transient value 0 and hands the object back;
/// the caller must immediately pass it into something that calls [`incr`].
pub fn reset(o: Obj) -> Obj {
    o.set_refcount(RefCount::Count(0));
    o
}

/// `makeObjectShared`-equivalent: promotes an object with `refcount == 1` to immortal. Fatal if
/// the precondition doesn't hold, since promoting a shared object to immortal would silently
/// freeze state another owner still expects to mutate/free normally.
pub fn make_immortal(o: &Obj) -> Result<()> {
    match o.refcount() {
        RefCount::Count(1) => {
            o.set_refcount(RefCount::Immortal);
            Ok(())
        }
        other => Err(Error::fatal(format!(
            "make_immortal requires refcount == 1, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::{AccessMeta, EvictionMode};
    use crate::obj::{ObjCell, Payload};

    fn fresh_int(v: i64) -> Obj {
        ObjCell::new(Payload::StringInt(v), AccessMeta::initial(EvictionMode::Recency, 0))
    }

    #[test]
    fn incr_decr_int_no_panic() {
        let o = fresh_int(42);
        incr(&o);
        assert_eq!(o.refcount(), RefCount::Count(2));
        let o2 = o.clone();
        decr(o2);
        assert_eq!(o.refcount(), RefCount::Count(1));
    }

    /// Property 3: `incr`/`decr` on an Int-encoded object touches only the logical counter, never
    /// the allocator — `mockalloc` catches any stray alloc/dealloc (or leak) across the test,
    /// the same way `examples/Diggsey-ijson/src/string.rs` uses it to police its own
    /// refcounting fast path.
    #[mockalloc::test]
    fn int_refcounting_does_not_touch_the_allocator() {
        let o = fresh_int(42);
        for _ in 0..100 {
            incr(&o);
        }
        for _ in 0..100 {
            decr(o.clone());
        }
        assert_eq!(o.refcount(), RefCount::Count(1));
    }

    #[test]
    fn immortal_incr_decr_is_noop() {
        let o = fresh_int(1);
        make_immortal(&o).unwrap();
        incr(&o);
        assert_eq!(o.refcount(), RefCount::Immortal);
        let o2 = o.clone();
        decr(o2);
        assert_eq!(o.refcount(), RefCount::Immortal);
    }

    #[test]
    fn reset_then_incr_round_trips() {
        let o = fresh_int(1);
        let o = reset(o);
        assert_eq!(o.refcount(), RefCount::Count(0));
        incr(&o);
        assert_eq!(o.refcount(), RefCount::Count(1));
    }

    #[test]
    fn make_immortal_requires_refcount_one() {
        let o = fresh_int(1);
        incr(&o);
        assert!(make_immortal(&o).is_err());
    }
}
