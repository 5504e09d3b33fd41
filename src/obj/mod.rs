//! The value object header (`SPEC_FULL.md` §3/§4.1) and its reference-counting sentinel.
//!
//! Real Rust memory safety comes from `Rc`: when the last `Rc<ObjCell>` handle drops, `Payload`'s
//! `Drop` glue releases whatever it owns (a `Vec` buffer, a container). Layered on top is an
//! explicit logical counter (`RefCount`) that reproduces the reference's *externally visible*
//! counting contract bit-for-bit — the `IMMORTAL` sentinel, `reset`-then-`incr`, and the
//! "decrement at zero is fatal" check — independently of how many actual `Rc` handles exist.
//! `examples/Diggsey-ijson/src/string.rs`'s manual `clone_impl`/`drop_impl` atomic refcounting is
//! the style this mirrors, minus the need for atomics since this layer is single-threaded.

pub mod payload;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::eviction::AccessMeta;
pub use payload::{Encoding, ModuleValue, ObjType, Payload};

/// Sentinel sharing an object can never mutate or free: `INT_MAX` in the reference, modeled
/// here as a distinct enum variant rather than a magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefCount {
    Count(i64),
    Immortal,
}

impl RefCount {
    pub fn is_immortal(self) -> bool {
        matches!(self, RefCount::Immortal)
    }
}

#[derive(Debug)]
pub struct ObjCell {
    access_meta: Cell<AccessMeta>,
    refcount: Cell<RefCount>,
    payload: RefCell<Payload>,
}

/// A value object handle. Cloning an `Obj` creates another `Rc` handle to the same cell; it does
/// not by itself change the logical [`RefCount`] — callers that mean to model another logical
/// owner call [`crate::refcount::incr`] explicitly, matching the reference's
/// `incrRefCount`/`decrRefCount` discipline.
pub type Obj = Rc<ObjCell>;

impl ObjCell {
    pub fn new(payload: Payload, access_meta: AccessMeta) -> Obj {
        Rc::new(ObjCell {
            access_meta: Cell::new(access_meta),
            refcount: Cell::new(RefCount::Count(1)),
            payload: RefCell::new(payload),
        })
    }

    pub fn obj_type(&self) -> ObjType {
        self.payload.borrow().obj_type()
    }

    pub fn encoding(&self) -> Encoding {
        self.payload.borrow().encoding()
    }

    pub fn refcount(&self) -> RefCount {
        self.refcount.get()
    }

    pub(crate) fn set_refcount(&self, rc: RefCount) {
        self.refcount.set(rc);
    }

    pub fn access_meta(&self) -> AccessMeta {
        self.access_meta.get()
    }

    pub fn set_access_meta(&self, meta: AccessMeta) {
        self.access_meta.set(meta);
    }

    pub fn payload(&self) -> std::cell::Ref<'_, Payload> {
        self.payload.borrow()
    }

    pub fn payload_mut(&self) -> std::cell::RefMut<'_, Payload> {
        self.payload.borrow_mut()
    }

    pub(crate) fn replace_payload(&self, payload: Payload) {
        *self.payload.borrow_mut() = payload;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::EvictionMode;

    #[test]
    fn new_object_has_refcount_one() {
        let o = ObjCell::new(Payload::StringInt(7), AccessMeta::initial(EvictionMode::Recency, 0));
        assert_eq!(o.refcount(), RefCount::Count(1));
        assert_eq!(o.obj_type(), ObjType::String);
        assert_eq!(o.encoding(), Encoding::Int);
    }
}
