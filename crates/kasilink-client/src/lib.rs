//! KasiLink client state machine.
//!
//! This crate composes the trust core into the surface a message-transport
//! layer consumes:
//!
//! ```text
//! kasilink-client
//!   ├─ Client            (event -> actions state machine)
//!   ├─ SystemEnv         (production Environment impl)
//!   └─ derive_group_key_off_thread  (blocking KDF on the blocking pool)
//! ```
//!
//! The client never performs I/O: the caller fetches transparency bundles,
//! drives the transport, and persists the identity through
//! `kasilink-core`'s `IdentityManager`. Trust rejections are actions, not
//! errors - refusing to message an unverified device is an expected outcome.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;
mod system_env;

pub use client::{Client, derive_group_key_off_thread};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent};
pub use system_env::SystemEnv;
