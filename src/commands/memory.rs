//! `MEMORY` subcommand dispatch (`SPEC_FULL.md` §4.7), grounded on
//! `examples/original_source/src/object.c`'s `memoryCommand`.

use crate::error::Error;
use crate::eviction::Config;
use crate::keyspace::Keyspace;
use crate::memory::{memory_doctor, memory_overhead, MemoryOverhead, OverheadInputs};
use crate::reply::Reply;
use crate::size;

/// One dictionary entry slot's worth of overhead, added on top of the value's own size and the
/// key's string allocation, matching the reference's `MEMORY USAGE` accounting.
const DICT_ENTRY_SLOT: usize = size::BUCKET_PTR_SIZE + size::ENTRY_OVERHEAD;

/// `MEMORY USAGE <key> [SAMPLES N]`. `N == 0` means exhaustive sampling. Unknown options or a
/// negative sample count are a syntax error.
pub fn usage(ks: &dyn Keyspace, key: &[u8], samples: Option<i64>, config: &Config) -> Result<Reply, Error> {
    let n = match samples {
        None => config.default_sample_size,
        Some(n) if n < 0 => return Err(Error::Syntax),
        Some(0) => usize::MAX,
        Some(n) => n as usize,
    };
    match ks.lookup_read_only(key) {
        None => Ok(Reply::Null),
        Some(o) => {
            let value_bytes = size::compute_size(&o, n)?;
            let total = value_bytes + key.len() + DICT_ENTRY_SLOT;
            Ok(Reply::Integer(total as i64))
        }
    }
}

/// `MEMORY STATS`: a flat key/value report derived from [`memory_overhead`].
pub fn stats(inputs: &OverheadInputs) -> Reply {
    let o = memory_overhead(inputs);
    Reply::Array(flatten_overhead(&o))
}

fn flatten_overhead(o: &MemoryOverhead) -> Vec<Reply> {
    let mut out = Vec::new();
    let mut kv = |k: &str, v: Reply| {
        out.push(Reply::bulk(k));
        out.push(v);
    };
    kv("total.allocated", Reply::Integer(o.total_allocated as i64));
    kv("startup.allocated", Reply::Integer(o.startup_allocated as i64));
    kv("peak.allocated", Reply::Integer(o.peak_allocated as i64));
    kv("fragmentation", Reply::Double(o.fragmentation));
    kv("replication.backlog", Reply::Integer(o.replication_backlog_bytes as i64));
    kv("clients.slaves", Reply::Integer(o.clients_slaves as i64));
    kv("clients.normal", Reply::Integer(o.clients_normal as i64));
    kv("aof.buffer", Reply::Integer(o.aof_buffer_bytes as i64));
    for (i, (main, expires)) in o.db_main_overhead.iter().zip(o.db_expires_overhead.iter()).enumerate() {
        kv(&format!("db.{i}.overhead.hashtable.main"), Reply::Integer(*main as i64));
        kv(&format!("db.{i}.overhead.hashtable.expires"), Reply::Integer(*expires as i64));
    }
    kv("overhead.total", Reply::Integer(o.overhead_total as i64));
    kv("keys.count", Reply::Integer(o.total_keys as i64));
    kv("dataset.bytes", Reply::Integer(o.dataset_bytes as i64));
    kv("dataset.percentage", Reply::Double(o.dataset_percentage));
    kv("peak.percentage", Reply::Double(o.peak_percentage));
    kv("allocator-fragmentation.bytes-per-key", Reply::Double(o.bytes_per_key));
    out
}

pub fn doctor(inputs: &OverheadInputs) -> Reply {
    let o = memory_overhead(inputs);
    Reply::status(memory_doctor(&o))
}

/// `MEMORY MALLOC-STATS`: allocator-specific dump when supported, fixed message otherwise. This
/// crate carries no allocator-introspection binding, so it always reports unsupported.
pub fn malloc_stats() -> Reply {
    Reply::status("Memory allocator stats not supported.")
}

/// `MEMORY PURGE`: asks the allocator to release dirty pages; `OK` when unsupported, matching
/// the reference's behavior on allocators without an arena-purge hook.
pub fn purge() -> Reply {
    Reply::status("OK")
}

pub fn help() -> Reply {
    Reply::Array(
        [
            "MEMORY USAGE <key> [SAMPLES <count>]",
            "MEMORY STATS",
            "MEMORY DOCTOR",
            "MEMORY MALLOC-STATS",
            "MEMORY PURGE",
            "MEMORY HELP",
        ]
        .into_iter()
        .map(Reply::status)
        .collect(),
    )
}
