//! # quayside-id
//!
//! Identifier types for terminal resources.
//!
//! Every persisted resource is addressed by a `{prefix}_{ulid}` string:
//!
//! - `yard_01HV4Z2WQXKJNM8GPQY6VBKC3D`
//! - `ctr_01HV4Z3MXNKPQR9HSTZ7WCLD4E`
//! - `loc_01HV4Z4NYPLTRS0JTUA8XDME5F`
//!
//! The prefix keeps a yard id from being passed where a container id is
//! expected, both in Rust signatures and in request payloads.

mod error;
mod macros;
mod types;

pub use error::IdError;
#[doc(hidden)]
pub use macros::parse_prefixed;
pub use types::*;

/// Re-export ulid for callers that mint ids from raw ULIDs.
pub use ulid::Ulid;
