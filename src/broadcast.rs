//! Downstream fan-out of book updates.
//!
//! The manager calls an [`OrderBookListener`] once per applied update and
//! for every reportable error. Listeners run while the manager holds its
//! session lock, so they must hand work off rather than block.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::Error;
use crate::orderbook::OrderBookState;

/// Receives the merged book after each applied update
///
/// # Reentrancy
///
/// Both callbacks run while the manager's session lock is held. That lock is
/// not reentrant: calling back into the manager from a callback (including
/// `get_state`, `phase`, or formatting it with `{:?}`) deadlocks. Forward the
/// state to another task instead, as [`ChannelListener`] does.
pub trait OrderBookListener: Send + Sync {
    /// Called with the post-update state
    ///
    /// A returned error is logged and passed to [`on_error`](Self::on_error);
    /// it never affects synchronization.
    fn on_broadcast(&self, state: &OrderBookState) -> Result<(), Error>;

    /// Called with errors the manager reports instead of returning
    fn on_error(&self, _error: &Error) {}
}

/// Listener that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl OrderBookListener for NoopListener {
    fn on_broadcast(&self, _state: &OrderBookState) -> Result<(), Error> {
        Ok(())
    }
}

/// Listener that republishes over `tokio::sync::broadcast` channels
///
/// Delivery is best-effort: slow receivers observe `Lagged` and skip ahead,
/// and having no receivers at all is not an error.
///
/// # Example
///
/// ```rust
/// use binance_depth_sync::broadcast::ChannelListener;
///
/// let listener = ChannelListener::new(64);
/// let mut books = listener.subscribe();
/// let mut errors = listener.subscribe_errors();
/// ```
#[derive(Debug, Clone)]
pub struct ChannelListener {
    books: broadcast::Sender<Arc<OrderBookState>>,
    errors: broadcast::Sender<Error>,
}

impl ChannelListener {
    /// Create a listener whose channels buffer `capacity` messages
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (books, _) = broadcast::channel(capacity);
        let (errors, _) = broadcast::channel(capacity);
        Self { books, errors }
    }

    /// Receive every broadcast book
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<OrderBookState>> {
        self.books.subscribe()
    }

    /// Receive every reported error
    pub fn subscribe_errors(&self) -> broadcast::Receiver<Error> {
        self.errors.subscribe()
    }

    /// Number of live book receivers
    pub fn receiver_count(&self) -> usize {
        self.books.receiver_count()
    }
}

impl OrderBookListener for ChannelListener {
    fn on_broadcast(&self, state: &OrderBookState) -> Result<(), Error> {
        // Err only means nobody is listening right now
        let _ = self.books.send(Arc::new(state.clone()));
        Ok(())
    }

    fn on_error(&self, error: &Error) {
        let _ = self.errors.send(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_listener_fans_out() {
        let listener = ChannelListener::new(8);
        let mut first = listener.subscribe();
        let mut second = listener.subscribe();
        assert_eq!(listener.receiver_count(), 2);

        let mut state = OrderBookState::new("BTCUSDT");
        state.last_update_id = 42;
        listener.on_broadcast(&state).unwrap();

        assert_eq!(first.recv().await.unwrap().last_update_id, 42);
        assert_eq!(second.recv().await.unwrap().last_update_id, 42);
    }

    #[test]
    fn test_no_receivers_is_not_an_error() {
        let listener = ChannelListener::new(1);
        assert!(listener.on_broadcast(&OrderBookState::new("BTCUSDT")).is_ok());
    }

    #[tokio::test]
    async fn test_errors_are_forwarded() {
        let listener = ChannelListener::new(4);
        let mut errors = listener.subscribe_errors();

        listener.on_error(&Error::BufferOverflow(10));

        assert!(matches!(
            errors.recv().await.unwrap(),
            Error::BufferOverflow(10)
        ));
    }
}
