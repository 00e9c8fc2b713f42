//! Port implementations backed by real I/O.

pub mod http;

pub use http::ReqwestTransport;
