//! CDP Session Client - One Connection, Multiplexed Traffic
//!
//! This crate talks to a browser's remote debugging endpoint over a single
//! persistent WebSocket and multiplexes two traffic classes on it:
//! synchronous command/response exchanges issued from any task, and
//! asynchronous events pushed by the browser at any time, interleaved with
//! responses in any order.
//!
//! Design decisions:
//! 1. Single WebSocket per browser connection, one reader task owns the
//!    receive side.
//! 2. Responses are correlated to commands by id, never by position -
//!    the browser is free to reorder across targets and domains.
//! 3. Events fan out to subscribers through a bounded worker pool so a
//!    slow callback can never stall the read path.
//! 4. Fail fast - no retries, no reconnect. Let the caller decide.

pub mod client;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod store;
pub mod versions;

pub use client::{CdpClient, ClientConfig};
pub use error::{CdpError, Result};
pub use protocol::{CdpCommand, CdpEvent, CdpMessage, CdpResponse};
pub use registry::{CallbackRegistry, EventCallback};
pub use store::MessageStore;
pub use versions::{VersionCatalog, LATEST_VERSION, SUPPORTED_VERSIONS};
