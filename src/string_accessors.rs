//! String accessors (`SPEC_FULL.md` §4.4): length, equality, comparison, numeric parsing,
//! transparent over any String encoding. Grounded on
//! `examples/original_source/src/object.c`'s `getLongLongFromObject`, `getDoubleFromObject`,
//! `getLongDoubleFromObject`, `compareStringObjectsWithFlags`, `equalStringObjects`, and on
//! `examples/Diggsey-ijson/src/number.rs`'s style of fallible, panic-free cross-encoding
//! numeric converters.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::obj::{Obj, ObjType, Payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFlags {
    /// `memcmp`-style byte comparison, ties broken by length.
    Binary,
    /// Locale-aware comparison (`strcoll`-equivalent). This crate has no locale subsystem, so
    /// it falls back to binary comparison, matching the "C" locale the reference uses by default.
    Locale,
}

fn as_bytes_buf(o: &Obj) -> Vec<u8> {
    match &*o.payload() {
        Payload::StringInt(v) => v.to_string().into_bytes(),
        Payload::StringInline(b) | Payload::StringHeap(b) => b.clone(),
        _ => unreachable!("non-String object passed to a string accessor"),
    }
}

fn require_string(o: &Obj) -> Result<()> {
    if o.obj_type() != ObjType::String {
        return Err(Error::fatal("string accessor called on non-String object"));
    }
    Ok(())
}

/// `stringObjectLen`: byte length, counted via the decimal-digit count for Int encoding.
pub fn len(o: &Obj) -> usize {
    match &*o.payload() {
        Payload::StringInt(v) => decimal_digit_count(*v),
        Payload::StringInline(b) | Payload::StringHeap(b) => b.len(),
        _ => unreachable!("non-String object passed to len()"),
    }
}

/// `decimal_digit_count`: digit count of `v` in decimal, including a leading `-` for negatives.
pub fn decimal_digit_count(v: i64) -> usize {
    if v == 0 {
        return 1;
    }
    let mut n = v.unsigned_abs();
    let mut digits = 0;
    while n > 0 {
        digits += 1;
        n /= 10;
    }
    digits + if v < 0 { 1 } else { 0 }
}

/// `equalStringObjects`: compares stored integers directly when both operands are Int-encoded,
/// otherwise compares bytes.
pub fn equal(a: &Obj, b: &Obj) -> bool {
    if let (Payload::StringInt(x), Payload::StringInt(y)) = (&*a.payload(), &*b.payload()) {
        return x == y;
    }
    as_bytes_buf(a) == as_bytes_buf(b)
}

/// `compareStringObjectsWithFlags`: returns negative/zero/positive per the requested flavor.
pub fn compare(a: &Obj, b: &Obj, flags: CompareFlags) -> Ordering {
    let _ = flags;
    let ba = as_bytes_buf(a);
    let bb = as_bytes_buf(b);
    // Lexicographic byte comparison, ties broken by length, is exactly Rust's derived `Ord`
    // for `Vec<u8>`/`[u8]`: equal-prefix slices compare by length, matching `memcmp` + length
    // tiebreak.
    ba.cmp(&bb)
}

/// `string2ll`: empty input, leading whitespace, trailing garbage and overflow are all failures.
/// Only an optional leading `-` is accepted — no leading `+`, no non-canonical forms like `-0` —
/// matching the reference's hand-rolled digit scan rather than `parse`'s more permissive grammar.
fn parse_i64_strict(s: &str) -> Result<i64> {
    if s.is_empty() {
        return Err(Error::not_an_integer());
    }
    if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        return Err(Error::not_an_integer());
    }
    let v: i64 = s.parse().map_err(|_| Error::not_an_integer())?;
    if v.to_string() != s {
        return Err(Error::not_an_integer());
    }
    Ok(v)
}

/// `getLongLongFromObject`: parses as signed 64-bit. For Int encoding, returns the payload
/// directly without reparsing.
pub fn to_i64(o: &Obj) -> Result<i64> {
    require_string(o)?;
    match &*o.payload() {
        Payload::StringInt(v) => Ok(*v),
        Payload::StringInline(b) | Payload::StringHeap(b) => {
            let s = std::str::from_utf8(b).map_err(|_| Error::not_an_integer())?;
            parse_i64_strict(s)
        }
        _ => unreachable!(),
    }
}

/// `getDoubleFromObject`: trailing whitespace is *not* accepted, the entire buffer must parse.
pub fn to_f64(o: &Obj) -> Result<f64> {
    require_string(o)?;
    match &*o.payload() {
        Payload::StringInt(v) => Ok(*v as f64),
        Payload::StringInline(b) | Payload::StringHeap(b) => {
            let s = std::str::from_utf8(b).map_err(|_| Error::not_a_float())?;
            parse_f64_strict(s)
        }
        _ => unreachable!(),
    }
}

/// `getLongDoubleFromObject`: modeled with `f64` under the hood, see `DESIGN.md`.
pub fn to_f80(o: &Obj) -> Result<f64> {
    to_f64(o)
}

fn parse_f64_strict(s: &str) -> Result<f64> {
    if s.is_empty() || s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        return Err(Error::not_a_float());
    }
    let v: f64 = s.parse().map_err(|_| Error::not_a_float())?;
    if v.is_nan() {
        return Err(Error::not_a_float());
    }
    Ok(v)
}

/// `_or_reply` wrapper: returns the default or caller-supplied message on failure instead of the
/// raw `Error`, matching the reference's client-reply translation.
pub fn to_i64_or_reply(o: &Obj, message: Option<&str>) -> Result<i64> {
    to_i64(o).map_err(|_| match message {
        Some(m) => Error::parse(m.to_string()),
        None => Error::not_an_integer(),
    })
}

pub fn to_f64_or_reply(o: &Obj, message: Option<&str>) -> Result<f64> {
    to_f64(o).map_err(|_| match message {
        Some(m) => Error::parse(m.to_string()),
        None => Error::not_a_float(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::{Config, EvictionMode};
    use crate::factory::{new_string, new_string_from_int};

    fn cfg() -> Config {
        Config { eviction_mode: EvictionMode::Recency, shared_integers_allowed: true, default_sample_size: 5 }
    }

    #[test]
    fn len_matches_digit_count_for_int() {
        let o = new_string_from_int(-123, &cfg(), 0);
        assert_eq!(len(&o), 4);
    }

    #[test]
    fn equal_across_encodings() {
        let a = new_string(b"12345", &cfg(), 0);
        let b = new_string_from_int(12345, &cfg(), 0);
        assert!(equal(&a, &b));
        assert_eq!(compare(&a, &b, CompareFlags::Binary), Ordering::Equal);
    }

    #[test]
    fn to_i64_rejects_malformed_input() {
        for bad in ["", " 3", "3 ", "abc", "9223372036854775808"] {
            let o = new_string(bad.as_bytes(), &cfg(), 0);
            assert!(to_i64(&o).is_err(), "expected {bad:?} to fail parsing");
        }
    }

    #[test]
    fn to_i64_accepts_boundaries() {
        for v in [i64::MIN, i64::MAX, 0, -1, 1] {
            let o = new_string(v.to_string().as_bytes(), &cfg(), 0);
            assert_eq!(to_i64(&o).unwrap(), v);
        }
    }

    #[test]
    fn to_f64_rejects_trailing_whitespace() {
        let o = new_string(b"3.5 ", &cfg(), 0);
        assert!(to_f64(&o).is_err());
    }
}
