//! WebSocket client for the diff depth stream.
//!
//! This module provides:
//!
//! - [`WebSocketClient`] - a single connection yielding [`DepthUpdate`]s
//! - [`DepthStreamClient`] - a [`StreamConnector`] that keeps one logical
//!   subscription alive across disconnects, reconnecting after a jittered
//!   delay until the returned handle is closed
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use binance_depth_sync::client::stream::{DepthStreamClient, DepthStreamHandler, StreamConnector};
//! use binance_depth_sync::types::DepthUpdate;
//! use binance_depth_sync::{Config, Error};
//!
//! struct Printer;
//!
//! impl DepthStreamHandler for Printer {
//!     fn on_open(&self) {}
//!     fn on_message(&self, update: DepthUpdate) {
//!         println!("[{}, {}]", update.first_update_id, update.final_update_id);
//!     }
//!     fn on_close(&self) {}
//!     fn on_error(&self, error: Error) {
//!         eprintln!("{error}");
//!     }
//! }
//!
//! # async fn example() {
//! let streams = DepthStreamClient::new(&Config::new());
//! let subscription = streams.subscribe("BTCUSDT", Arc::new(Printer));
//! // ...
//! subscription.close();
//! # }
//! ```

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rand::Rng;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::types::DepthUpdate;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle callbacks for one depth subscription
///
/// Callbacks run on the subscription's task and must not block.
pub trait DepthStreamHandler: Send + Sync {
    /// A connection was (re)established
    fn on_open(&self);

    /// One decoded depth update, in arrival order
    fn on_message(&self, update: DepthUpdate);

    /// An established connection went away
    fn on_close(&self);

    /// A recoverable problem (malformed frame, failed connect, transport error)
    fn on_error(&self, error: Error);
}

/// Handle to a running subscription
pub trait DepthSubscription: Send + Sync {
    /// Stop reconnecting and detach the handler. Idempotent.
    fn close(&self);
}

/// Opens depth subscriptions
pub trait StreamConnector: Send + Sync {
    /// Start streaming `symbol` into `handler`
    fn subscribe(&self, symbol: &str, handler: Arc<dyn DepthStreamHandler>)
        -> Box<dyn DepthSubscription>;
}

/// One WebSocket connection to a raw depth stream
///
/// # Thread Safety
///
/// This client is NOT thread-safe. [`DepthStreamClient`] owns each instance
/// on a single task.
#[derive(Debug)]
pub struct WebSocketClient {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
}

impl WebSocketClient {
    /// Connect to a stream URL
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the handshake does not finish within
    /// `timeout`, or the underlying WebSocket error.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, Error> {
        let (ws_stream, _response) =
            tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url))
                .await
                .map_err(|_| Error::Timeout)??;
        let (write, read) = ws_stream.split();

        Ok(Self { write, read })
    }

    /// Receive the next depth update
    ///
    /// Pings are answered automatically. A frame that does not decode as a
    /// [`DepthUpdate`] yields [`Error::MalformedFrame`]; the connection is
    /// still usable afterwards.
    ///
    /// # Returns
    ///
    /// The next update, or `None` if the connection is closed.
    pub async fn next(&mut self) -> Option<Result<DepthUpdate, Error>> {
        loop {
            match self.read.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(
                        serde_json::from_str::<DepthUpdate>(&text)
                            .map_err(|e| Error::MalformedFrame(format!("{}: {}", e, text))),
                    );
                }
                Ok(Message::Ping(data)) => {
                    if let Err(e) = self.write.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(_)) => {
                    return Some(Err(Error::ConnectionClosed));
                }
                Ok(_) => {
                    // Binary, Pong and raw frames carry no depth data
                    continue;
                }
                Err(e) => {
                    return Some(Err(e.into()));
                }
            }
        }
    }

    /// Close the WebSocket connection
    pub async fn close(&mut self) -> Result<(), Error> {
        self.write.close().await?;
        Ok(())
    }
}

/// Configuration for reconnection behavior
///
/// Every reconnect waits a delay drawn uniformly from
/// `[min_delay_ms, max_delay_ms]`, so many clients dropped at once do not
/// reconnect in lockstep. There is no retry limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Lower bound of the jitter window
    pub min_delay_ms: u64,
    /// Upper bound of the jitter window
    pub max_delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1_000,
            max_delay_ms: 2_000,
        }
    }
}

impl ReconnectConfig {
    /// Create a new reconnect config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lower bound of the jitter window in milliseconds
    pub fn min_delay_ms(mut self, ms: u64) -> Self {
        self.min_delay_ms = ms;
        self
    }

    /// Set the upper bound of the jitter window in milliseconds
    pub fn max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    /// The jitter window, normalised so the bounds are ordered
    pub fn window(&self) -> RangeInclusive<u64> {
        let lo = self.min_delay_ms.min(self.max_delay_ms);
        let hi = self.min_delay_ms.max(self.max_delay_ms);
        lo..=hi
    }

    /// Draw the delay before the next reconnect attempt
    pub fn next_delay(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(self.window()))
    }
}

/// Connector for live depth streams with automatic reconnection
#[derive(Debug, Clone)]
pub struct DepthStreamClient {
    base_url: String,
    timeout: Duration,
    reconnect: ReconnectConfig,
}

impl DepthStreamClient {
    /// Create a connector from the stream settings in `config`
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.stream_base_url().trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            reconnect: config.reconnect().clone(),
        }
    }

    /// Raw stream URL for `symbol`'s 100ms diff depth stream
    pub fn stream_url(&self, symbol: &str) -> String {
        format!("{}/{}@depth@100ms", self.base_url, symbol.to_lowercase())
    }
}

impl StreamConnector for DepthStreamClient {
    fn subscribe(
        &self,
        symbol: &str,
        handler: Arc<dyn DepthStreamHandler>,
    ) -> Box<dyn DepthSubscription> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let supervisor = Supervisor {
            url: self.stream_url(symbol),
            timeout: self.timeout,
            reconnect: self.reconnect.clone(),
            handler,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(supervisor.run());

        Box::new(StreamSubscription {
            shutdown: shutdown_tx,
            task: Mutex::new(Some(task)),
        })
    }
}

/// Handle returned by [`DepthStreamClient::subscribe`]
///
/// Dropping the handle closes the subscription.
#[derive(Debug)]
pub struct StreamSubscription {
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StreamSubscription {
    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }
}

impl DepthSubscription for StreamSubscription {
    fn close(&self) {
        self.shutdown.send_replace(true);
        // The task observes the flag at its next await and exits on its own,
        // closing the socket politely; the handle is only released here.
        self.task.lock().take();
    }
}

impl Drop for StreamSubscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Task state for one logical subscription
struct Supervisor {
    url: String,
    timeout: Duration,
    reconnect: ReconnectConfig,
    handler: Arc<dyn DepthStreamHandler>,
    shutdown: watch::Receiver<bool>,
}

impl Supervisor {
    fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    async fn run(mut self) {
        while !self.is_shutdown() {
            let connect = WebSocketClient::connect(&self.url, self.timeout);
            let connected = tokio::select! {
                biased;
                _ = self.shutdown.changed() => return,
                result = connect => result,
            };

            match connected {
                Ok(client) => {
                    info!(url = %self.url, "depth stream connected");
                    self.handler.on_open();
                    if !self.pump(client).await {
                        return;
                    }
                    self.handler.on_close();
                }
                Err(e) => {
                    warn!(url = %self.url, error = %e, "depth stream connect failed");
                    self.handler.on_error(e);
                }
            }

            let delay = self.reconnect.next_delay();
            warn!(
                url = %self.url,
                delay_ms = delay.as_millis() as u64,
                "depth stream closed, reconnecting"
            );
            tokio::select! {
                biased;
                _ = self.shutdown.changed() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Forward frames until the connection ends
    ///
    /// Returns `false` if the subscription was closed while connected.
    async fn pump(&mut self, mut client: WebSocketClient) -> bool {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.shutdown.changed() => {
                    if let Err(e) = client.close().await {
                        debug!(error = %e, "error closing depth stream");
                    }
                    return false;
                }
                frame = client.next() => frame,
            };

            match frame {
                Some(Ok(update)) => self.handler.on_message(update),
                Some(Err(e @ Error::MalformedFrame(_))) => {
                    warn!(url = %self.url, error = %e, "dropping malformed depth frame");
                    self.handler.on_error(e);
                }
                Some(Err(Error::ConnectionClosed)) | None => return true,
                Some(Err(e)) => {
                    warn!(url = %self.url, error = %e, "depth stream transport error");
                    self.handler.on_error(e);
                    return true;
                }
            }
        }
    }
}
