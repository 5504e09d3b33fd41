//! `OBJECT` subcommand dispatch (`SPEC_FULL.md` §4.7), grounded on
//! `examples/original_source/src/object.c`'s `objectCommand`/`objectCommandGetKey`.

use crate::error::Error;
use crate::eviction::{Config, EvictionMode};
use crate::keyspace::Keyspace;
use crate::reply::Reply;

/// Sentinel refcount the reference reports for shared/immortal objects (`OBJ_SHARED_REFCOUNT`).
pub const SHARED_REFCOUNT_REPLY: i64 = i32::MAX as i64;

pub fn refcount(ks: &dyn Keyspace, key: &[u8]) -> Reply {
    match ks.lookup_read_only(key) {
        None => Reply::Null,
        Some(o) => match o.refcount() {
            crate::obj::RefCount::Immortal => Reply::Integer(SHARED_REFCOUNT_REPLY),
            crate::obj::RefCount::Count(n) => Reply::Integer(n),
        },
    }
}

pub fn encoding(ks: &dyn Keyspace, key: &[u8]) -> Reply {
    match ks.lookup_read_only(key) {
        None => Reply::Null,
        Some(o) => Reply::bulk(o.encoding().name()),
    }
}

/// `objectCommand`'s `IDLETIME` branch: seconds since last access. `now_ticks` and the stored
/// `lru_tick` are both coarse wall-clock ticks, so this is the straightforward difference.
pub fn idletime(ks: &dyn Keyspace, key: &[u8], config: &Config, now_ticks: u32) -> Reply {
    if config.eviction_mode == EvictionMode::Frequency {
        return Error::WrongEvictionModeIdle.into();
    }
    match ks.lookup_read_only(key) {
        None => Reply::Null,
        Some(o) => {
            let idle = now_ticks.wrapping_sub(o.access_meta().lru_tick());
            Reply::Integer(idle as i64)
        }
    }
}

/// `objectCommand`'s `FREQ` branch: the logical access frequency after applying decay.
pub fn freq(ks: &dyn Keyspace, key: &[u8], config: &Config, now_minute: u16) -> Reply {
    if config.eviction_mode == EvictionMode::Recency {
        return Error::WrongEvictionModeFreq.into();
    }
    match ks.lookup_read_only(key) {
        None => Reply::Null,
        Some(o) => Reply::Integer(o.access_meta().decayed_freq(now_minute) as i64),
    }
}

pub fn help() -> Reply {
    Reply::Array(
        [
            "OBJECT REFCOUNT <key>",
            "OBJECT ENCODING <key>",
            "OBJECT IDLETIME <key>",
            "OBJECT FREQ <key>",
            "OBJECT HELP",
        ]
        .into_iter()
        .map(Reply::status)
        .collect(),
    )
}
