//! Wire types for the upstream REST and stream APIs.
//!
//! - [`depth`] - Depth snapshot (REST) and diff depth update (stream) bodies

pub mod depth;

pub use depth::{DepthSnapshot, DepthUpdate, Level};

/// Upstream sequence number ("update id")
pub type UpdateId = u64;

/// Timestamp in milliseconds since Unix epoch
pub type TimestampMs = u64;
