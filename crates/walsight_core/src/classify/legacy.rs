//! The flat legacy request shape.

use std::fmt;

use walsight_codec::etcdserverpb::Request;
use walsight_codec::{CodecResult, Decode};

/// Request method of a legacy request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// Empty method string.
    Noop,
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `QGET`
    QGet,
    /// `SYNC`
    Sync,
    /// Any other method string.
    Other(String),
}

impl Method {
    /// Maps a wire method string to a method.
    #[must_use]
    pub fn parse(method: String) -> Self {
        match method.as_str() {
            "" => Self::Noop,
            "GET" => Self::Get,
            "PUT" => Self::Put,
            "POST" => Self::Post,
            "DELETE" => Self::Delete,
            "QGET" => Self::QGet,
            "SYNC" => Self::Sync,
            _ => Self::Other(method),
        }
    }

    /// The wire method string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Noop => "",
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::QGet => "QGET",
            Self::Sync => "SYNC",
            Self::Other(method) => method,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noop => f.write_str("noop"),
            Self::Other(method) => write!(f, "\"{}\"", method.as_bytes().escape_ascii()),
            known => f.write_str(known.as_str()),
        }
    }
}

/// A decoded legacy request.
///
/// Fields mirror `etcdserverpb.Request` in wire order. `prev_exist` and
/// `refresh` distinguish unset from `false`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRequest {
    pub id: u64,
    pub method: Method,
    pub path: String,
    pub val: String,
    pub dir: bool,
    pub prev_value: String,
    pub prev_index: u64,
    pub prev_exist: Option<bool>,
    pub expiration: i64,
    pub wait: bool,
    pub since: u64,
    pub recursive: bool,
    pub sorted: bool,
    pub quorum: bool,
    pub time: i64,
    pub stream: bool,
    pub refresh: Option<bool>,
}

impl From<Request> for LegacyRequest {
    fn from(r: Request) -> Self {
        Self {
            id: r.id,
            method: Method::parse(r.method),
            path: r.path,
            val: r.val,
            dir: r.dir,
            prev_value: r.prev_value,
            prev_index: r.prev_index,
            prev_exist: r.prev_exist,
            expiration: r.expiration,
            wait: r.wait,
            since: r.since,
            recursive: r.recursive,
            sorted: r.sorted,
            quorum: r.quorum,
            time: r.time,
            stream: r.stream,
            refresh: r.refresh,
        }
    }
}

pub(crate) fn decode(payload: &[u8]) -> CodecResult<LegacyRequest> {
    Request::decode_strict(payload).map(LegacyRequest::from)
}
