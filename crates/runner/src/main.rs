mod sim;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use metrics::create_metrics;
use model::{MarketEvent, TradingPair};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use session::{BookView, MarketSession, SessionConfig};
use sim::FeedSimulator;
use tokio::sync::{mpsc, watch};
use tracing::info;

/// Cadence of the summary/volatility panel refresh.
const DISPLAY_INTERVAL: Duration = Duration::from_secs(1);

/// Cadence of simulated depth batches.
const FEED_INTERVAL: Duration = Duration::from_millis(250);

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[tokio::main]
async fn main() {
    common::init_logging();

    let mut args = std::env::args().skip(1);
    let base = args.next().unwrap_or_else(|| "BTC".to_string());
    let quote = args.next().unwrap_or_else(|| "USDT".to_string());
    let pair = TradingPair::new(base, quote);

    info!(
        pair = %pair,
        depth_stream = %pair.depth_stream_url(),
        trade_stream = %pair.trade_stream_url(),
        "starting depth view (simulated feed)"
    );

    let metrics = create_metrics();
    let session = Arc::new(MarketSession::new(
        pair.clone(),
        SessionConfig::default(),
        metrics.clone(),
    ));

    let (sender, mut receiver) = mpsc::channel::<MarketEvent>(1024);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Feed task: depth batch every tick, a trade every few ticks.
    let feed_pair = pair.clone();
    let mut feed_shutdown = shutdown_rx.clone();
    let feed_handle = tokio::spawn(async move {
        let mut simulator = FeedSimulator::new(&feed_pair, dec!(50000));
        let mut interval = tokio::time::interval(FEED_INTERVAL);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let depth = simulator.next_depth(now_ms());
                    if sender.send(MarketEvent::Depth(depth)).await.is_err() {
                        break;
                    }
                    ticks += 1;
                    if ticks % 4 == 0 {
                        let trade = simulator.next_trade(now_ms());
                        if sender.send(MarketEvent::Trade(trade)).await.is_err() {
                            break;
                        }
                    }
                }
                _ = feed_shutdown.changed() => {
                    if *feed_shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    });

    // Ctrl+C handler.
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, initiating shutdown");
            let _ = shutdown_tx_clone.send(true);
        }
    });

    println!("🚀 {} LIVE DEPTH VIEW (simulated)", session.pair());
    println!("-------------------------------------------------------------");

    let mut display_interval = tokio::time::interval(DISPLAY_INTERVAL);
    let mut shutdown_rx = shutdown_rx;

    loop {
        tokio::select! {
            event = receiver.recv() => {
                match event {
                    Some(event) => {
                        if let MarketEvent::Trade(ref trade) = event {
                            println!(
                                "TRADE     | price: {:<12} qty: {:<10} maker: {:?}",
                                trade.price, trade.qty, trade.maker_side
                            );
                        }
                        session.handle_event(&event);
                    }
                    None => break,
                }
            }
            _ = display_interval.tick() => {
                render_panel(&session);
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    drop(receiver);
    let _ = feed_handle.await;

    println!("\n{}", metrics.snapshot());
    info!("Shutdown complete");
}

fn render_panel(session: &MarketSession) {
    println!("ORDERBOOK | {}", session.summary());

    for row in book_rows(&session.book_view()) {
        println!("{}", row);
    }

    let vol = session.volatility();
    let spike = if vol.spike.is_spike { "SPIKE!" } else { "Normal" };
    println!(
        "VOLATILITY| atr {:.4} | pctile {:.0}% | velocity {:.2}/s | bb width {:.4} | spike {} | hist vol {:.2}%",
        vol.atr,
        vol.percentile,
        vol.velocity,
        vol.bollinger_width,
        spike,
        vol.historical * Decimal::ONE_HUNDRED,
    );
}

/// One line per level, padded to the deeper side so a thin side never
/// hides the other side's levels.
fn book_rows(view: &BookView) -> Vec<String> {
    let placeholder = || "--".to_string();
    let rows = view.bids.len().max(view.asks.len());

    (0..rows)
        .map(|i| {
            let bid = view.bids.get(i).map(|l| l.to_string()).unwrap_or_else(placeholder);
            let ask = view.asks.get(i).map(|l| l.to_string()).unwrap_or_else(placeholder);
            format!("  L{:<2} bid {:>24} | ask {:<24}", i + 1, bid, ask)
        })
        .collect()
}
