//! Stand-in for the client reply API of `SPEC_FULL.md` §6 (`reply_null`, `reply_error`,
//! `reply_status`, `reply_bulk_string`, `reply_i64`, `reply_double`, `reply_multi_bulk_header`).
//! Modeled as a plain enum so `commands::*` is unit-testable by inspecting the value returned
//! rather than by writing to a real wire connection.

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Null,
    Error(String),
    Status(String),
    Bulk(Vec<u8>),
    Integer(i64),
    Double(f64),
    Array(Vec<Reply>),
}

impl Reply {
    pub fn bulk(s: impl Into<Vec<u8>>) -> Self {
        Reply::Bulk(s.into())
    }

    pub fn status(s: impl Into<String>) -> Self {
        Reply::Status(s.into())
    }

    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }
}

impl From<crate::error::Error> for Reply {
    fn from(e: crate::error::Error) -> Self {
        Reply::Error(e.to_string())
    }
}
