//! The `OBJECT` and `MEMORY` introspection surfaces (`SPEC_FULL.md` §4.7), the only user-visible
//! commands this layer exposes.

pub mod memory;
pub mod object;
