//! Local order book and its synchronization.
//!
//! - [`book`] - the [`OrderBookState`] data structure
//! - [`logic`] - pure rules for classifying and applying diff updates
//! - [`manager`] - [`OrderBookManager`], which drives snapshot + stream sync
//!
//! # Example
//!
//! ```rust
//! use binance_depth_sync::orderbook::logic::{apply_update, classify, UpdateClass};
//! use binance_depth_sync::orderbook::OrderBookState;
//! use binance_depth_sync::types::DepthUpdate;
//!
//! let mut book = OrderBookState::new("BTCUSDT");
//! book.last_update_id = 100;
//!
//! let update = DepthUpdate::new(
//!     "BTCUSDT",
//!     95,
//!     101,
//!     vec![("65000.00".to_string(), "1.5".to_string())],
//!     vec![],
//! );
//! assert_eq!(classify(&update, book.last_update_id), UpdateClass::Bridging);
//!
//! apply_update(&mut book, &update);
//! assert_eq!(book.best_bid(), Some((65000.0, 1.5)));
//! ```

pub mod book;
pub mod logic;
pub mod manager;

pub use book::OrderBookState;
pub use logic::UpdateClass;
pub use manager::{OrderBookManager, SyncPhase};
