//! Snapshot + diff stream synchronization for one symbol.
//!
//! This module provides [`OrderBookManager`], which owns the local book for
//! the active symbol and keeps it consistent with the exchange:
//!
//! 1. `init` opens the diff stream and requests a REST snapshot.
//! 2. Updates that arrive before the snapshot lands are queued.
//! 3. When the snapshot lands the queue is replayed in arrival order. Updates
//!    already covered by the snapshot are dropped, and the first update whose
//!    range contains `last_update_id + 1` bridges stream and snapshot.
//! 4. From then on every contiguous update is applied and broadcast. A gap
//!    in the sequence throws the book back to step 2 with a fresh snapshot.
//!
//! # Design
//!
//! All session state sits behind one `parking_lot::Mutex`. Stream callbacks
//! and snapshot completions each run to completion under that lock, which
//! serializes every evaluation and keeps readers from seeing a half-applied
//! update. The snapshot request itself runs on a spawned task without the
//! lock.
//!
//! At most one snapshot request is in flight per session. Its outcome is
//! published on a `tokio::sync::watch` channel; anyone else who needs a
//! snapshot while it is pending (a concurrent `init`, a reconnect, a gap)
//! waits on the same channel instead of issuing another request.
//!
//! Every reset of the session (new symbol, shutdown) bumps a session id.
//! Snapshot results and stream callbacks tagged with an older id are
//! discarded.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::broadcast::OrderBookListener;
use crate::client::rest::{validate_limit, RestClient, SnapshotSource};
use crate::client::stream::{DepthStreamClient, DepthStreamHandler, DepthSubscription, StreamConnector};
use crate::config::Config;
use crate::error::Error;
use crate::types::DepthUpdate;

use super::logic::{apply_update, classify, UpdateClass};
use super::OrderBookState;

/// Synchronization phase of the active symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No usable book and no snapshot request pending
    Unsynced,
    /// First snapshot requested; updates are being queued
    Buffering,
    /// Snapshot applied; waiting for the update that bridges it
    Bridging,
    /// Book is live and every update is being applied
    Synced,
    /// A previous book exists but a fresh snapshot is pending
    Resyncing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResyncReason {
    StreamOpened,
    LimitChanged,
    SequenceGap,
    StaleSnapshot,
    BufferOverflow,
    Requested,
}

type SyncOutcome = Option<Result<OrderBookState, Error>>;

/// Mutable state for the active symbol
struct Session {
    id: u64,
    symbol: Option<String>,
    limit: u32,
    book: Option<OrderBookState>,
    snapshot_ready: bool,
    synced: bool,
    buffered: VecDeque<DepthUpdate>,
    in_flight: Option<watch::Receiver<SyncOutcome>>,
    subscription: Option<Box<dyn DepthSubscription>>,
    /// Whether the subscription has reported its first connection
    stream_opened: bool,
}

impl Session {
    fn new(limit: u32) -> Self {
        Self {
            id: 0,
            symbol: None,
            limit,
            book: None,
            snapshot_ready: false,
            synced: false,
            buffered: VecDeque::new(),
            in_flight: None,
            subscription: None,
            stream_opened: false,
        }
    }

    /// Start a new session; the caller owns closing the old subscription
    fn reset(&mut self, symbol: Option<String>, limit: u32) {
        self.id = self.id.wrapping_add(1);
        self.symbol = symbol;
        self.limit = limit;
        self.book = None;
        self.snapshot_ready = false;
        self.synced = false;
        self.buffered.clear();
        self.in_flight = None;
        self.stream_opened = false;
    }

    fn phase(&self) -> SyncPhase {
        if self.symbol.is_none() {
            SyncPhase::Unsynced
        } else if self.synced {
            SyncPhase::Synced
        } else if self.snapshot_ready {
            SyncPhase::Bridging
        } else if self.in_flight.is_some() {
            if self.book.is_some() {
                SyncPhase::Resyncing
            } else {
                SyncPhase::Buffering
            }
        } else {
            SyncPhase::Unsynced
        }
    }
}

struct Inner {
    config: Config,
    snapshots: Arc<dyn SnapshotSource>,
    streams: Arc<dyn StreamConnector>,
    listener: Arc<dyn OrderBookListener>,
    session: Mutex<Session>,
}

/// Keeps a local order book for one symbol in sync with the exchange.
///
/// The manager is cheap to clone; clones share the same session.
///
/// The listener is invoked under the session lock and must not call back
/// into the manager; see [`OrderBookListener`].
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use binance_depth_sync::broadcast::ChannelListener;
/// use binance_depth_sync::orderbook::OrderBookManager;
/// use binance_depth_sync::Config;
///
/// # async fn example() -> binance_depth_sync::Result<()> {
/// let listener = ChannelListener::new(64);
/// let mut updates = listener.subscribe();
/// let manager = OrderBookManager::new(Config::new(), Arc::new(listener))?;
///
/// let book = manager.init("BTCUSDT", Some(1000)).await?;
/// println!("snapshot at {}", book.last_update_id);
///
/// while let Ok(book) = updates.recv().await {
///     println!("best bid {:?}", book.best_bid());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OrderBookManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for OrderBookManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.inner.session.lock();
        f.debug_struct("OrderBookManager")
            .field("symbol", &session.symbol)
            .field("limit", &session.limit)
            .field("phase", &session.phase())
            .field("buffered", &session.buffered.len())
            .finish()
    }
}

impl OrderBookManager {
    /// Create a manager backed by the live REST and stream endpoints
    ///
    /// # Errors
    ///
    /// Returns an error if the REST client cannot be built from `config`.
    pub fn new(config: Config, listener: Arc<dyn OrderBookListener>) -> Result<Self, Error> {
        let snapshots = Arc::new(RestClient::new(&config)?);
        let streams = Arc::new(DepthStreamClient::new(&config));
        Ok(Self::with_sources(config, snapshots, streams, listener))
    }

    /// Create a manager over arbitrary snapshot and stream sources
    pub fn with_sources(
        config: Config,
        snapshots: Arc<dyn SnapshotSource>,
        streams: Arc<dyn StreamConnector>,
        listener: Arc<dyn OrderBookListener>,
    ) -> Self {
        let limit = config.default_limit();
        Self {
            inner: Arc::new(Inner {
                config,
                snapshots,
                streams,
                listener,
                session: Mutex::new(Session::new(limit)),
            }),
        }
    }

    /// Start (or join) synchronization of `symbol`
    ///
    /// Switching to a new symbol tears down the previous stream and book.
    /// Calling again for the active symbol with a different `limit` keeps
    /// the stream and forces a resync; with the same limit it joins the
    /// pending snapshot request, or returns the current book if one is
    /// already in place.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for a limit outside `[1, 1000]` or an
    ///   empty symbol, before any network call
    /// - the snapshot source's error if the snapshot request fails
    /// - [`Error::SyncFailure`] if the session is replaced or shut down
    ///   while the request is pending
    /// - [`Error::NotInitialized`] if no book exists once it settles
    pub async fn init(&self, symbol: &str, limit: Option<u32>) -> Result<OrderBookState, Error> {
        let limit = validate_limit(limit.unwrap_or_else(|| self.inner.config.default_limit()))?;
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(Error::InvalidArgument("symbol must not be empty".to_string()));
        }

        let (new_session, retired) = {
            let mut session = self.inner.session.lock();
            if session.symbol.as_deref() != Some(symbol.as_str()) {
                let retired = session.subscription.take();
                session.reset(Some(symbol.clone()), limit);
                info!(symbol = %symbol, limit, "tracking new symbol");
                (Some(session.id), retired)
            } else {
                if session.limit != limit {
                    session.limit = limit;
                    self.inner.resync(&mut session, ResyncReason::LimitChanged);
                }
                (None, None)
            }
        };

        if let Some(subscription) = retired {
            subscription.close();
        }
        if let Some(session_id) = new_session {
            self.inner.open_stream(session_id, &symbol);
        }

        let flight = {
            let mut session = self.inner.session.lock();
            if session.symbol.as_deref() != Some(symbol.as_str()) {
                return Err(Error::SyncFailure(format!(
                    "{} was replaced before synchronization started",
                    symbol
                )));
            }
            if let Some(flight) = session.in_flight.clone() {
                flight
            } else if session.snapshot_ready {
                return session.book.clone().ok_or(Error::NotInitialized);
            } else {
                self.inner.start_sync(&mut session)
            }
        };

        await_outcome(flight).await
    }

    /// Force a fresh snapshot and wait for it
    ///
    /// Joins the pending request if one exists.
    pub async fn resync(&self) -> Result<OrderBookState, Error> {
        let flight = {
            let mut session = self.inner.session.lock();
            if session.symbol.is_none() {
                return Err(Error::NotInitialized);
            }
            self.inner.resync(&mut session, ResyncReason::Requested);
            session.in_flight.clone()
        };

        match flight {
            Some(flight) => await_outcome(flight).await,
            None => Err(Error::NotInitialized),
        }
    }

    /// Get a copy of the current book
    ///
    /// While resyncing this is the last good book, which may be stale.
    pub fn get_state(&self) -> Option<OrderBookState> {
        self.inner.session.lock().book.clone()
    }

    /// Get the synchronization phase
    pub fn phase(&self) -> SyncPhase {
        self.inner.session.lock().phase()
    }

    /// Get the active symbol
    pub fn symbol(&self) -> Option<String> {
        self.inner.session.lock().symbol.clone()
    }

    /// Get the snapshot depth in use
    pub fn limit(&self) -> u32 {
        self.inner.session.lock().limit
    }

    /// Number of updates queued for the pending snapshot
    pub fn buffered_len(&self) -> usize {
        self.inner.session.lock().buffered.len()
    }

    /// Close the stream and discard all state
    ///
    /// A snapshot request still in flight completes in the background and
    /// its result is dropped. `init` may be called again afterwards.
    pub fn shutdown(&self) {
        let retired = {
            let mut session = self.inner.session.lock();
            let retired = session.subscription.take();
            if let Some(symbol) = session.symbol.as_deref() {
                info!(symbol = %symbol, "shutting down order book");
            }
            session.reset(None, self.inner.config.default_limit());
            retired
        };

        if let Some(subscription) = retired {
            subscription.close();
        }
    }
}

impl Inner {
    /// Subscribe the diff stream for `session_id` and store its handle
    fn open_stream(self: &Arc<Self>, session_id: u64, symbol: &str) {
        let handler = Arc::new(SessionHandler {
            inner: Arc::downgrade(self),
            session_id,
        });
        let subscription = self.streams.subscribe(symbol, handler);

        let mut session = self.session.lock();
        if session.id == session_id && session.subscription.is_none() {
            session.subscription = Some(subscription);
        } else {
            drop(session);
            subscription.close();
        }
    }

    /// Return the pending snapshot request, starting one if needed
    fn start_sync(self: &Arc<Self>, session: &mut Session) -> watch::Receiver<SyncOutcome> {
        if let Some(flight) = &session.in_flight {
            return flight.clone();
        }

        let Some(symbol) = session.symbol.clone() else {
            let (_, rx) = watch::channel(Some(Err(Error::NotInitialized)));
            return rx;
        };

        let (tx, rx) = watch::channel(None);
        session.in_flight = Some(rx.clone());

        let inner = Arc::clone(self);
        let session_id = session.id;
        let limit = session.limit;
        debug!(symbol = %symbol, limit, "requesting depth snapshot");

        tokio::spawn(async move {
            // A panicking source must still settle the request
            let source = Arc::clone(&inner.snapshots);
            let fetch = tokio::spawn(async move { source.fetch_snapshot(&symbol, limit).await });
            let fetched = match fetch.await {
                Ok(fetched) => fetched,
                Err(e) => Err(Error::SyncFailure(format!(
                    "snapshot request aborted: {}",
                    e
                ))),
            };
            let outcome = inner.complete_sync(session_id, fetched);
            tx.send_replace(Some(outcome));
        });

        rx
    }

    /// Install a fetched snapshot and replay the queue
    fn complete_sync(
        self: &Arc<Self>,
        session_id: u64,
        fetched: Result<OrderBookState, Error>,
    ) -> Result<OrderBookState, Error> {
        let mut session = self.session.lock();
        if session.id != session_id {
            debug!("discarding snapshot for a retired session");
            return Err(Error::SyncFailure(
                "session was reset while the snapshot was in flight".to_string(),
            ));
        }
        session.in_flight = None;

        match fetched {
            Ok(book) => {
                info!(
                    symbol = %book.symbol,
                    last_update_id = book.last_update_id,
                    buffered = session.buffered.len(),
                    "snapshot applied"
                );
                session.book = Some(book);
                session.snapshot_ready = true;
                session.synced = false;
                self.drain(&mut session);
                session.book.clone().ok_or(Error::NotInitialized)
            }
            Err(e) => {
                warn!(symbol = ?session.symbol, error = %e, "snapshot request failed");
                session.snapshot_ready = false;
                self.listener.on_error(&e);
                Err(e)
            }
        }
    }

    /// Evaluate queued updates in arrival order
    fn drain(self: &Arc<Self>, session: &mut Session) {
        let mut pending = std::mem::take(&mut session.buffered);

        while let Some(update) = pending.pop_front() {
            self.evaluate(session, update);

            if !session.snapshot_ready {
                // A resync started mid-replay; what is left is newer than the
                // gap, so it waits for the next snapshot.
                session.buffered = pending;
                return;
            }
        }
    }

    /// Decide what to do with one update against a ready snapshot
    fn evaluate(self: &Arc<Self>, session: &mut Session, update: DepthUpdate) {
        let Some(last) = session.book.as_ref().map(|book| book.last_update_id) else {
            return;
        };
        let class = classify(&update, last);

        match (session.synced, class) {
            (_, UpdateClass::Obsolete) => {
                trace!(
                    last_update_id = last,
                    first = update.first_update_id,
                    last = update.final_update_id,
                    "dropping obsolete update"
                );
            }
            (false, UpdateClass::Bridging) => {
                session.synced = true;
                info!(
                    symbol = ?session.symbol,
                    snapshot_id = last,
                    first = update.first_update_id,
                    last = update.final_update_id,
                    "order book synced"
                );
                self.apply(session, &update);
            }
            (false, UpdateClass::Gap) => {
                // The snapshot is older than anything the stream can still
                // deliver, so no update will ever bridge it.
                debug!(
                    last_update_id = last,
                    first = update.first_update_id,
                    "snapshot predates the stream, requesting a newer one"
                );
                self.resync(session, ResyncReason::StaleSnapshot);
            }
            (false, UpdateClass::InOrder) => {
                trace!(first = update.first_update_id, "dropping pre-sync update");
            }
            (true, UpdateClass::Gap) => {
                let gap = Error::SequenceGap {
                    expected: last.saturating_add(1),
                    first: update.first_update_id,
                    last: update.final_update_id,
                };
                warn!(symbol = ?session.symbol, error = %gap, "order book out of sync");
                self.listener.on_error(&gap);
                self.resync(session, ResyncReason::SequenceGap);
            }
            (true, UpdateClass::Bridging | UpdateClass::InOrder) => {
                self.apply(session, &update);
            }
        }
    }

    fn apply(&self, session: &mut Session, update: &DepthUpdate) {
        if let Some(book) = session.book.as_mut() {
            apply_update(book, update);
            if let Err(e) = self.listener.on_broadcast(book) {
                warn!(error = %e, "order book broadcast failed");
                self.listener.on_error(&e);
            }
        }
    }

    /// Drop sync progress and make sure a fresh snapshot is on its way
    fn resync(self: &Arc<Self>, session: &mut Session, reason: ResyncReason) {
        session.snapshot_ready = false;
        session.synced = false;
        session.buffered.clear();

        if session.symbol.is_none() {
            return;
        }
        info!(symbol = ?session.symbol, ?reason, "resynchronizing order book");
        // Background resyncs report failures through the listener only
        let _ = self.start_sync(session);
    }

    fn on_stream_open(self: &Arc<Self>, session_id: u64) {
        let mut session = self.session.lock();
        if session.id != session_id {
            return;
        }

        let first_open = !std::mem::replace(&mut session.stream_opened, true);
        if first_open && (session.snapshot_ready || session.in_flight.is_some()) {
            // Nothing predates the first connection; a snapshot older than
            // the stream is caught as stale by the first update.
            debug!(symbol = ?session.symbol, "diff stream opened, keeping initial snapshot");
            return;
        }
        self.resync(&mut session, ResyncReason::StreamOpened);
    }

    fn on_stream_update(self: &Arc<Self>, session_id: u64, update: DepthUpdate) {
        let mut session = self.session.lock();
        if session.id != session_id {
            return;
        }

        if session.snapshot_ready {
            self.evaluate(&mut session, update);
            return;
        }

        if session.buffered.len() >= self.config.max_buffered_updates() {
            let overflow = Error::BufferOverflow(session.buffered.len());
            warn!(symbol = ?session.symbol, error = %overflow, "discarding buffered updates");
            self.listener.on_error(&overflow);
            self.resync(&mut session, ResyncReason::BufferOverflow);
        }
        session.buffered.push_back(update);
    }

    fn on_stream_close(&self, session_id: u64) {
        let mut session = self.session.lock();
        if session.id != session_id {
            return;
        }
        debug!(symbol = ?session.symbol, "diff stream closed, book no longer live");
        session.snapshot_ready = false;
        session.synced = false;
    }

    fn on_stream_error(&self, session_id: u64, error: Error) {
        if self.session.lock().id != session_id {
            return;
        }
        self.listener.on_error(&error);
    }
}

/// Routes one subscription's callbacks to the session that opened it
struct SessionHandler {
    inner: Weak<Inner>,
    session_id: u64,
}

impl DepthStreamHandler for SessionHandler {
    fn on_open(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_stream_open(self.session_id);
        }
    }

    fn on_message(&self, update: DepthUpdate) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_stream_update(self.session_id, update);
        }
    }

    fn on_close(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_stream_close(self.session_id);
        }
    }

    fn on_error(&self, error: Error) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_stream_error(self.session_id, error);
        }
    }
}

async fn await_outcome(mut flight: watch::Receiver<SyncOutcome>) -> Result<OrderBookState, Error> {
    let outcome = flight.wait_for(Option::is_some).await.map_err(|_| {
        Error::SyncFailure("synchronization task ended without a result".to_string())
    })?;
    outcome.clone().unwrap_or(Err(Error::NotInitialized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::broadcast::NoopListener;
    use crate::types::Level;

    /// Snapshot source that always returns the same book
    struct FixedSnapshot {
        last_update_id: u64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotSource for FixedSnapshot {
        async fn fetch_snapshot(&self, symbol: &str, _limit: u32) -> Result<OrderBookState, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut book = OrderBookState::new(symbol);
            book.last_update_id = self.last_update_id;
            Ok(book)
        }
    }

    struct NullSubscription;

    impl DepthSubscription for NullSubscription {
        fn close(&self) {}
    }

    #[derive(Default)]
    struct CapturingStreams {
        handlers: Mutex<Vec<Arc<dyn DepthStreamHandler>>>,
    }

    impl StreamConnector for CapturingStreams {
        fn subscribe(
            &self,
            _symbol: &str,
            handler: Arc<dyn DepthStreamHandler>,
        ) -> Box<dyn DepthSubscription> {
            self.handlers.lock().push(handler);
            Box::new(NullSubscription)
        }
    }

    fn lv(price: &str, qty: &str) -> Level {
        (price.to_string(), qty.to_string())
    }

    fn build(
        config: Config,
        last_update_id: u64,
    ) -> (OrderBookManager, Arc<FixedSnapshot>, Arc<CapturingStreams>) {
        let snapshots = Arc::new(FixedSnapshot {
            last_update_id,
            calls: AtomicUsize::new(0),
        });
        let streams = Arc::new(CapturingStreams::default());
        let manager = OrderBookManager::with_sources(
            config,
            snapshots.clone(),
            streams.clone(),
            Arc::new(NoopListener),
        );
        (manager, snapshots, streams)
    }

    #[test]
    fn test_session_phases() {
        let mut session = Session::new(1000);
        assert_eq!(session.phase(), SyncPhase::Unsynced);

        session.reset(Some("BTCUSDT".to_string()), 1000);
        assert_eq!(session.phase(), SyncPhase::Unsynced);

        let (_tx, rx) = watch::channel(None);
        session.in_flight = Some(rx);
        assert_eq!(session.phase(), SyncPhase::Buffering);

        session.book = Some(OrderBookState::new("BTCUSDT"));
        assert_eq!(session.phase(), SyncPhase::Resyncing);

        session.in_flight = None;
        session.snapshot_ready = true;
        assert_eq!(session.phase(), SyncPhase::Bridging);

        session.synced = true;
        assert_eq!(session.phase(), SyncPhase::Synced);
    }

    #[test]
    fn test_reset_bumps_session_id() {
        let mut session = Session::new(1000);
        session.buffered.push_back(DepthUpdate::new("BTCUSDT", 1, 2, vec![], vec![]));
        session.reset(Some("ETHUSDT".to_string()), 50);

        assert_eq!(session.id, 1);
        assert_eq!(session.limit, 50);
        assert!(session.buffered.is_empty());
    }

    #[tokio::test]
    async fn test_drain_keeps_updates_after_a_gap() {
        let (manager, snapshots, streams) = build(Config::new(), 100);
        manager.init("BTCUSDT", Some(10)).await.unwrap();
        let handler = streams.handlers.lock()[0].clone();

        handler.on_message(DepthUpdate::new("BTCUSDT", 101, 101, vec![lv("1", "1")], vec![]));
        assert_eq!(manager.phase(), SyncPhase::Synced);

        // Queue [gap, a, b] behind a resync, then replay it by hand
        {
            let inner = &manager.inner;
            let mut session = inner.session.lock();
            session.buffered.push_back(DepthUpdate::new("BTCUSDT", 150, 151, vec![], vec![]));
            session.buffered.push_back(DepthUpdate::new("BTCUSDT", 152, 153, vec![], vec![]));
            session.buffered.push_back(DepthUpdate::new("BTCUSDT", 154, 155, vec![], vec![]));
            inner.drain(&mut session);

            assert!(!session.snapshot_ready);
            assert_eq!(session.phase(), SyncPhase::Resyncing);
            let kept: Vec<u64> = session.buffered.iter().map(|u| u.first_update_id).collect();
            assert_eq!(kept, vec![152, 154]);
        }
        assert_eq!(snapshots.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_overflow_forces_resync() {
        let (manager, snapshots, streams) = build(Config::new().with_max_buffered_updates(2), 100);
        manager.init("BTCUSDT", Some(10)).await.unwrap();
        let handler = streams.handlers.lock()[0].clone();

        handler.on_close();
        assert_eq!(manager.phase(), SyncPhase::Unsynced);

        handler.on_message(DepthUpdate::new("BTCUSDT", 90, 95, vec![], vec![]));
        handler.on_message(DepthUpdate::new("BTCUSDT", 96, 99, vec![], vec![]));
        assert_eq!(manager.buffered_len(), 2);

        // Third update overflows: queue is dropped, this one starts the new queue
        handler.on_message(DepthUpdate::new("BTCUSDT", 100, 102, vec![lv("5", "1")], vec![]));
        assert_eq!(manager.buffered_len(), 1);
        assert_eq!(manager.phase(), SyncPhase::Resyncing);

        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        assert_eq!(snapshots.calls.load(Ordering::SeqCst), 2);
        assert_eq!(manager.phase(), SyncPhase::Synced);
        assert_eq!(manager.get_state().unwrap().last_update_id, 102);
    }

    #[tokio::test]
    async fn test_debug_output() {
        let (manager, _, _) = build(Config::new(), 1);
        let text = format!("{:?}", manager);
        assert!(text.contains("Unsynced"));
    }
}
