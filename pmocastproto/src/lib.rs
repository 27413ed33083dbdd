//! # PMOCast Protocol
//!
//! Wire-level types shared by the cast receiver bridge and its remote
//! controller sessions:
//!
//! - [`ProtocolValue`] : closed tagged value type carried inside message
//!   envelopes, with a lossless [`encode`]/[`decode`] round trip
//! - [`RemoteError`] / [`RemoteEvent`] : structured error and event
//!   values that survive transport encoding
//! - [`rpc`] : the RPC namespace envelopes (init, appData, set, call,
//!   asyncCall and their outbound counterparts)
//! - [`media`] : the generic media-control namespace (GET_STATUS, LOAD,
//!   MEDIA_STATUS, INVALID_REQUEST, ...)
//!
//! All envelopes serialize to camelCase JSON; the actual byte transport
//! is the session manager's concern, not this crate's.

pub mod error;
pub mod event;
pub mod media;
pub mod rpc;
pub mod value;

pub use error::{ErrorCategory, ErrorSeverity, RemoteError};
pub use event::RemoteEvent;
pub use media::{MediaInformation, StreamType};
pub use value::{decode, encode, ProtocolValue};
