//! Console interface for exploring prediction markets
//!
//! Read-mostly commands over the Kalshi API: market listings, order books,
//! and the reconstructed portfolio, plus an advisory risk check for a
//! proposed order. Nothing here places orders.

mod config;

use anyhow::{bail, Context, Result};
use arbiter_core::{OrderRequest, OrderSide, Outcome, PositionStatus};
use arbiter_kalshi::KalshiClient;
use arbiter_risk::RiskGate;
use config::Config;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn make_client(config: &Config) -> KalshiClient {
    match &config.kalshi_api_key {
        Some(key) => KalshiClient::with_auth(key.clone(), config.use_demo),
        None => KalshiClient::new(config.use_demo),
    }
}

async fn markets_cmd(config: &Config, limit: u32) -> Result<()> {
    let client = make_client(config);
    let markets = client.list_markets(Some("open"), Some(limit)).await?;

    println!(
        "{:<28} {:<44} {:>6} {:>6} {:>6} {:>9}",
        "TICKER", "TITLE", "BID", "ASK", "SPRD", "VOL"
    );
    for m in &markets {
        let mut title = m.title.clone();
        if title.chars().count() > 42 {
            title = title.chars().take(41).collect();
            title.push('…');
        }
        println!(
            "{:<28} {:<44} {:>6.2} {:>6.2} {:>6.2} {:>9}",
            m.ticker,
            title,
            m.yes_bid,
            m.yes_ask,
            m.spread(),
            m.volume
        );
    }
    println!("\n{} markets shown", markets.len());
    Ok(())
}

async fn book_cmd(config: &Config, ticker: &str) -> Result<()> {
    let client = make_client(config);
    let market = client.get_market(ticker).await?;
    let book = client.get_orderbook(ticker).await?;

    println!("\n{}", market.title);
    println!("{} | {:?}\n", market.ticker, market.status);

    println!(
        "{:>8} {:>8}   {:>8} {:>8}",
        "BID QTY", "BID $", "ASK $", "ASK QTY"
    );
    let rows = book.yes_bids.len().max(book.yes_asks.len()).min(10);
    for i in 0..rows {
        let (bid_qty, bid_price) = match book.yes_bids.get(i) {
            Some(l) => (l.quantity.to_string(), format!("{:.2}", l.price)),
            None => (String::new(), String::new()),
        };
        let (ask_price, ask_qty) = match book.yes_asks.get(i) {
            Some(l) => (format!("{:.2}", l.price), l.quantity.to_string()),
            None => (String::new(), String::new()),
        };
        println!(
            "{:>8} {:>8}   {:>8} {:>8}",
            bid_qty, bid_price, ask_price, ask_qty
        );
    }

    if let (Some(mid), Some(spread)) = (book.mid(), book.spread()) {
        println!("\nMid: ${:.2}  Spread: ${:.2}", mid, spread);
    }
    Ok(())
}

async fn portfolio_cmd(config: &Config) -> Result<()> {
    let client = make_client(config);
    let balance = client.get_balance().await?;
    let positions = client.positions().await?;

    let (active, rest): (Vec<_>, Vec<_>) = positions
        .iter()
        .partition(|p| p.status == PositionStatus::Active);

    if !active.is_empty() {
        println!(
            "{:<28} {:<5} {:>6} {:>9} {:>9} {:>9}",
            "TICKER", "SIDE", "QTY", "COST", "VALUE", "P&L"
        );
        for p in &active {
            println!(
                "{:<28} {:<5} {:>6} {:>9.2} {:>9.2} {:>+9.2}",
                p.market_id,
                format!("{:?}", p.outcome).to_uppercase(),
                p.quantity,
                p.cost_basis,
                p.market_value(),
                p.pnl()
            );
        }
    }

    let active_value: Decimal = active.iter().map(|p| p.market_value()).sum();
    let settled_pnl: Decimal = rest.iter().map(|p| p.pnl()).sum();

    println!();
    println!("  Cash:             ${:.2}", balance.available);
    println!(
        "  Active positions: ${:.2}  ({} markets)",
        active_value,
        active.len()
    );
    println!(
        "  Portfolio total:  ${:.2}",
        balance.available + active_value
    );
    println!(
        "  Settled P&L:      ${:+.2}  ({} markets)",
        settled_pnl,
        rest.len()
    );
    Ok(())
}

async fn check_cmd(config: &Config, args: &[String]) -> Result<()> {
    let [ticker, outcome, order_side, price, quantity] = args else {
        bail!("Usage: arbiter check <ticker> <yes|no> <buy|sell> <price> <quantity>");
    };
    let order = OrderRequest {
        market_id: ticker.clone(),
        outcome: outcome.parse::<Outcome>().map_err(anyhow::Error::msg)?,
        order_side: order_side
            .parse::<OrderSide>()
            .map_err(anyhow::Error::msg)?,
        price: price
            .parse::<Decimal>()
            .with_context(|| format!("Invalid price: {}", price))?,
        quantity: quantity
            .parse::<u32>()
            .with_context(|| format!("Invalid quantity: {}", quantity))?,
    };

    let client = make_client(config);
    let positions = client.positions().await?;

    let mut gate = RiskGate::new(config.limits.clone());
    match gate.check_order(&order, &positions) {
        Some(rejection) => println!("REJECT: {}", rejection),
        None => println!("ALLOW: ${:.2} into {}", order.cost(), order.market_id),
    }
    Ok(())
}

fn usage() {
    println!("\narbiter - prediction market portfolio console\n");
    println!("Usage: arbiter <command> [args]\n");
    println!("Commands:");
    println!("  markets [limit]                              List open markets");
    println!("  book <ticker>                                Show orderbook");
    println!("  portfolio                                    Show balance & reconstructed positions");
    println!("  check <ticker> <yes|no> <buy|sell> <price> <quantity>");
    println!("                                               Run a proposed order through the risk gate");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Not an error if the file doesn't exist
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((cmd, rest)) = args.split_first() else {
        usage();
        return Ok(());
    };

    let config = Config::from_env()?;
    if config.use_demo {
        info!("Using Kalshi demo API");
    }

    match cmd.as_str() {
        "markets" => {
            let limit = match rest.first() {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("Invalid limit: {}", raw))?,
                None => 20,
            };
            markets_cmd(&config, limit).await
        }
        "book" => {
            let Some(ticker) = rest.first() else {
                bail!("Usage: arbiter book <ticker>");
            };
            book_cmd(&config, ticker).await
        }
        "portfolio" => portfolio_cmd(&config).await,
        "check" => check_cmd(&config, rest).await,
        other => {
            usage();
            bail!("Unknown command: {}", other);
        }
    }
}
