//! Upstream clients.
//!
//! This module contains:
//!
//! - [`rest`] - HTTP client for depth snapshots
//! - [`stream`] - WebSocket client and reconnecting subscriber for diff updates

pub mod rest;
pub mod stream;

pub use rest::{RestClient, SnapshotSource};
pub use stream::{DepthStreamClient, DepthStreamHandler, DepthSubscription, StreamConnector};
