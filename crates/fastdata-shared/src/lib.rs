//! # fastdata-shared
//!
//! Types shared by every FastData crate: account identifiers, the KV social
//! graph key layout, the FastFS upload payload and protocol constants.

pub mod constants;
pub mod error;
pub mod fastfs;
pub mod kv;
pub mod types;

pub use error::{AccountIdError, EncodeError, KvError};
pub use types::{AccountId, Network, TxHash};
