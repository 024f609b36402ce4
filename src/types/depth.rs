//! Depth message types.
//!
//! Prices and quantities stay as the exact decimal strings the exchange
//! sends, so a level can be replaced or removed by its upstream key without
//! any float round-tripping.

use serde::{Deserialize, Serialize};

use super::{TimestampMs, UpdateId};

/// One price level change: `(price, quantity)`
///
/// Serialized as a two element JSON array, e.g. `["65000.10", "0.25"]`.
pub type Level = (String, String);

/// Body of `GET /depth`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthSnapshot {
    /// Sequence id the snapshot is valid at
    pub last_update_id: UpdateId,
    /// Bid levels, best first
    pub bids: Vec<Level>,
    /// Ask levels, best first
    pub asks: Vec<Level>,
}

/// Diff depth stream event (`<symbol>@depth@100ms`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DepthUpdate {
    /// Event type, always `depthUpdate`
    #[serde(rename = "e", default)]
    pub event_type: String,
    /// Event time
    #[serde(rename = "E", default)]
    pub event_time: TimestampMs,
    /// Symbol
    #[serde(rename = "s", default)]
    pub symbol: String,
    /// First update id in this event
    #[serde(rename = "U")]
    pub first_update_id: UpdateId,
    /// Final update id in this event
    #[serde(rename = "u")]
    pub final_update_id: UpdateId,
    /// Bid changes
    #[serde(rename = "b")]
    pub bids: Vec<Level>,
    /// Ask changes
    #[serde(rename = "a")]
    pub asks: Vec<Level>,
}

impl DepthUpdate {
    /// Build an update covering `[first, last]` with the given changes
    pub fn new(
        symbol: impl Into<String>,
        first_update_id: UpdateId,
        final_update_id: UpdateId,
        bids: Vec<Level>,
        asks: Vec<Level>,
    ) -> Self {
        Self {
            event_type: "depthUpdate".to_string(),
            event_time: 0,
            symbol: symbol.into(),
            first_update_id,
            final_update_id,
            bids,
            asks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_depth_update() {
        let frame = r#"{
            "e": "depthUpdate",
            "E": 1700000000123,
            "s": "BNBBTC",
            "U": 157,
            "u": 160,
            "b": [["0.0024", "10"]],
            "a": [["0.0026", "100"], ["0.0027", "0.00000000"]]
        }"#;

        let update: DepthUpdate = serde_json::from_str(frame).unwrap();
        assert_eq!(update.event_type, "depthUpdate");
        assert_eq!(update.event_time, 1_700_000_000_123);
        assert_eq!(update.symbol, "BNBBTC");
        assert_eq!(update.first_update_id, 157);
        assert_eq!(update.final_update_id, 160);
        assert_eq!(update.bids, vec![("0.0024".to_string(), "10".to_string())]);
        assert_eq!(update.asks.len(), 2);
        assert_eq!(update.asks[1].1, "0.00000000");
    }

    #[test]
    fn test_parse_snapshot() {
        let body = r#"{
            "lastUpdateId": 1027024,
            "bids": [["4.00000000", "431.00000000"]],
            "asks": [["4.00000200", "12.00000000"]]
        }"#;

        let snapshot: DepthSnapshot = serde_json::from_str(body).unwrap();
        assert_eq!(snapshot.last_update_id, 1_027_024);
        assert_eq!(snapshot.bids[0].0, "4.00000000");
        assert_eq!(snapshot.asks[0].1, "12.00000000");
    }

    #[test]
    fn test_rejects_frame_without_sequence() {
        let frame = r#"{"result": null, "id": 1}"#;
        assert!(serde_json::from_str::<DepthUpdate>(frame).is_err());
    }
}
