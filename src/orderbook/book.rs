//! Core order book state.
//!
//! Sides are keyed by the exact upstream price string, which is what diff
//! updates address levels by. Ordered views (best bid/ask, top N) parse the
//! keys on demand.

use rustc_hash::FxHashMap;

use crate::types::{DepthSnapshot, UpdateId};

use super::logic::apply_levels;

/// One side of the book: price string -> quantity string
pub type BookSide = FxHashMap<String, String>;

/// Local order book for a single symbol.
///
/// # Invariants
///
/// 1. Every stored quantity parses as a positive, finite number. All
///    mutation goes through [`apply_levels`], which removes a level instead
///    of storing a zero or garbage quantity.
///
/// 2. `last_update_id` is the id of the last update folded into the book
///    (or the snapshot id). It never decreases while the book is synced.
///
/// # Thread Safety
///
/// This struct is `Send + Sync` but not internally synchronized. The
/// [`OrderBookManager`](super::OrderBookManager) owns the live instance and
/// hands out clones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBookState {
    /// Symbol, upper case (e.g. `BTCUSDT`)
    pub symbol: String,

    /// Sequence id of the last applied snapshot or update
    pub last_update_id: UpdateId,

    /// Bid levels
    pub bids: BookSide,

    /// Ask levels
    pub asks: BookSide,
}

impl OrderBookState {
    /// Create a new empty book for the given symbol
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            last_update_id: 0,
            bids: BookSide::default(),
            asks: BookSide::default(),
        }
    }

    /// Build a book from a REST snapshot
    ///
    /// Duplicate prices collapse to their last occurrence.
    #[must_use]
    pub fn from_snapshot(symbol: impl Into<String>, snapshot: &DepthSnapshot) -> Self {
        let mut book = Self::new(symbol);
        apply_levels(&mut book.bids, &snapshot.bids);
        apply_levels(&mut book.asks, &snapshot.asks);
        book.last_update_id = snapshot.last_update_id;
        book
    }

    /// Get the best bid (highest price)
    ///
    /// Returns `(price, quantity)` or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<(f64, f64)> {
        self.top_bids(1).into_iter().next()
    }

    /// Get the best ask (lowest price)
    ///
    /// Returns `(price, quantity)` or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<(f64, f64)> {
        self.top_asks(1).into_iter().next()
    }

    /// Get the mid price
    ///
    /// Returns the average of best bid and best ask, or `None` if either is missing.
    #[must_use]
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }

    /// Get the spread
    #[must_use]
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        }
    }

    /// Get the top N bid levels, sorted by price descending (best first)
    #[must_use]
    pub fn top_bids(&self, n: usize) -> Vec<(f64, f64)> {
        let mut levels = numeric_levels(&self.bids);
        levels.sort_by(|a, b| b.0.total_cmp(&a.0));
        levels.truncate(n);
        levels
    }

    /// Get the top N ask levels, sorted by price ascending (best first)
    #[must_use]
    pub fn top_asks(&self, n: usize) -> Vec<(f64, f64)> {
        let mut levels = numeric_levels(&self.asks);
        levels.sort_by(|a, b| a.0.total_cmp(&b.0));
        levels.truncate(n);
        levels
    }

    /// Check if the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Get the number of price levels as `(bids, asks)`
    #[must_use]
    pub fn num_levels(&self) -> (usize, usize) {
        (self.bids.len(), self.asks.len())
    }
}

fn numeric_levels(side: &BookSide) -> Vec<(f64, f64)> {
    side.iter()
        .filter_map(|(price, qty)| Some((price.parse().ok()?, qty.parse().ok()?)))
        .collect()
}
