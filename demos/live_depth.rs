//! Live depth test - keeps a Binance order book in sync and prints it
//!
//! Usage:
//!   cargo run --example live_depth
//!
//! Optional:
//!   BINANCE_ENV=testnet    # Use the spot testnet (default: production)
//!   BINANCE_SYMBOL=ETHUSDT # Symbol to track (default: BTCUSDT)
//!   BINANCE_LIMIT=100      # Snapshot depth, 1..=1000 (default: 1000)

use std::sync::Arc;
use std::time::Instant;

use binance_depth_sync::broadcast::ChannelListener;
use binance_depth_sync::config::Environment;
use binance_depth_sync::{Config, OrderBookManager, OrderBookState};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("binance_depth_sync=info".parse()?),
        )
        .init();

    let env = match std::env::var("BINANCE_ENV")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "testnet" => Environment::Testnet,
        _ => Environment::Production,
    };
    let symbol = std::env::var("BINANCE_SYMBOL").unwrap_or_else(|_| "BTCUSDT".to_string());
    let limit = match std::env::var("BINANCE_LIMIT") {
        Ok(value) => Some(value.parse::<u32>()?),
        Err(_) => None,
    };

    println!("=== Binance Depth Live Test ===\n");

    let listener = ChannelListener::new(256);
    let mut books = listener.subscribe();
    let mut errors = listener.subscribe_errors();

    let manager = OrderBookManager::new(Config::new().with_environment(env), Arc::new(listener))?;

    println!("Fetching snapshot for {}...", symbol);
    let snapshot = manager.init(&symbol, limit).await?;
    let (bids, asks) = snapshot.num_levels();
    println!(
        "[SNAPSHOT] {} | {} bids, {} asks | lastUpdateId: {}\n",
        snapshot.symbol, bids, asks, snapshot.last_update_id
    );

    println!("=== Streaming Live Data ===");
    println!("(Press Ctrl+C to stop)\n");

    let mut update_count = 0u64;
    let start_time = Instant::now();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping...");
                break;
            }
            book = books.recv() => match book {
                Ok(book) => {
                    update_count += 1;
                    print_book_summary(&book);

                    // Print stats every 50 updates
                    if update_count % 50 == 0 {
                        let elapsed = start_time.elapsed().as_secs_f64();
                        println!(
                            "\n--- {} updates in {:.1}s ({:.1} upd/s) | phase: {:?} ---\n",
                            update_count,
                            elapsed,
                            update_count as f64 / elapsed,
                            manager.phase()
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    println!("[LAGGED] skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            error = errors.recv() => {
                if let Ok(error) = error {
                    println!("[ERROR] {}", error);
                }
            }
        }
    }

    manager.shutdown();

    let elapsed = start_time.elapsed().as_secs_f64();
    println!("Received {} updates in {:.1}s", update_count, elapsed);
    Ok(())
}

fn print_book_summary(book: &OrderBookState) {
    let bid = book
        .best_bid()
        .map(|(p, q)| format!("{} x {}", p, q))
        .unwrap_or_else(|| "-".to_string());
    let ask = book
        .best_ask()
        .map(|(p, q)| format!("{} x {}", p, q))
        .unwrap_or_else(|| "-".to_string());
    let spread = book
        .spread()
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "-".to_string());

    println!(
        "[BOOK] {} @ {} | bid: {} | ask: {} | spread: {}",
        book.symbol, book.last_update_id, bid, ask, spread
    );
}
