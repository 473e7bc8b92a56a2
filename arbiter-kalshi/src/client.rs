//! Kalshi API client
//!
//! Provides methods for interacting with the Kalshi REST API, including
//! the paginated portfolio history used for position reconstruction.

use crate::types::{
    BalanceResponse, FillsResponse, MarketResponse, MarketsResponse, OrderbookResponse,
    SettlementsResponse,
};
use arbiter_core::{
    ArbiterError, Balance, Fill, OrderBook, OrderSide, Platform, Position, PredictionMarket,
    Settlement,
};
use arbiter_portfolio::{reconcile, MarketQuote};
use reqwest::Client;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, instrument};

/// Base URL for Kalshi API
const KALSHI_API_BASE: &str = "https://api.elections.kalshi.com/trade-api/v2";
const KALSHI_DEMO_API_BASE: &str = "https://demo-api.kalshi.co/trade-api/v2";

/// Page size for paginated portfolio endpoints
const PAGE_LIMIT: u32 = 100;
/// Safety cap on pagination so a bad cursor can never loop forever
const MAX_PAGES: usize = 50;

/// Kalshi API client
#[derive(Clone)]
pub struct KalshiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl KalshiClient {
    /// Create a new Kalshi client (unauthenticated, for public endpoints)
    pub fn new(use_demo: bool) -> Self {
        let base_url = if use_demo {
            KALSHI_DEMO_API_BASE
        } else {
            KALSHI_API_BASE
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.to_string(),
            api_key: None,
        }
    }

    /// Create a new authenticated Kalshi client
    pub fn with_auth(api_key: String, use_demo: bool) -> Self {
        let mut client = Self::new(use_demo);
        client.api_key = Some(api_key);
        client
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the client is authenticated
    pub fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    /// Helper to ensure authentication
    fn require_auth(&self) -> Result<&str, ArbiterError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ArbiterError::auth("Kalshi authentication required"))
    }

    async fn check_status(
        response: reqwest::Response,
        not_found: Option<&str>,
    ) -> Result<reqwest::Response, ArbiterError> {
        match response.status().as_u16() {
            401 => return Err(ArbiterError::auth("Invalid or expired Kalshi API key")),
            404 => {
                if let Some(what) = not_found {
                    return Err(ArbiterError::not_found(format!("Market not found: {}", what)));
                }
            }
            _ => {}
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ArbiterError::api(format!(
                "Kalshi API error ({}): {}",
                status, body
            )));
        }
        Ok(response)
    }

    /// List markets from Kalshi
    #[instrument(skip(self))]
    pub async fn list_markets(
        &self,
        status: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<PredictionMarket>, ArbiterError> {
        let mut url = format!("{}/markets", self.base_url);

        let mut params = Vec::new();
        if let Some(s) = status {
            params.push(format!("status={}", s));
        }
        if let Some(l) = limit {
            params.push(format!("limit={}", l));
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        debug!("Fetching Kalshi markets from: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ArbiterError::network(format!("Failed to fetch markets: {}", e)))?;
        let response = Self::check_status(response, None).await?;

        let markets_response: MarketsResponse = response
            .json()
            .await
            .map_err(|e| ArbiterError::parse(format!("Failed to parse markets response: {}", e)))?;

        Ok(markets_response
            .markets
            .iter()
            .map(|m| m.to_market())
            .collect())
    }

    /// Get a single market by ticker
    #[instrument(skip(self))]
    pub async fn get_market(&self, ticker: &str) -> Result<PredictionMarket, ArbiterError> {
        let url = format!("{}/markets/{}", self.base_url, ticker);

        debug!("Fetching Kalshi market: {}", ticker);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ArbiterError::network(format!("Failed to fetch market: {}", e)))?;
        let response = Self::check_status(response, Some(ticker)).await?;

        let market_response: MarketResponse = response
            .json()
            .await
            .map_err(|e| ArbiterError::parse(format!("Failed to parse market response: {}", e)))?;

        Ok(market_response.market.to_market())
    }

    /// Get a market, returning `None` instead of an error.
    ///
    /// Position reconstruction looks up markets that may have been delisted
    /// or whose responses no longer parse; those must degrade the single
    /// position rather than abort the whole batch.
    pub async fn get_market_safe(&self, ticker: &str) -> Option<PredictionMarket> {
        match self.get_market(ticker).await {
            Ok(market) => Some(market),
            Err(e) => {
                debug!("Market lookup failed for {}: {}", ticker, e);
                None
            }
        }
    }

    /// Get the order book for a market
    #[instrument(skip(self))]
    pub async fn get_orderbook(&self, ticker: &str) -> Result<OrderBook, ArbiterError> {
        let url = format!("{}/markets/{}/orderbook", self.base_url, ticker);

        debug!("Fetching Kalshi orderbook for: {}", ticker);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ArbiterError::network(format!("Failed to fetch orderbook: {}", e)))?;
        let response = Self::check_status(response, Some(ticker)).await?;

        let orderbook_response: OrderbookResponse = response
            .json()
            .await
            .map_err(|e| ArbiterError::parse(format!("Failed to parse orderbook: {}", e)))?;

        Ok(orderbook_response.orderbook.to_order_book(ticker))
    }

    /// Get the account balance (requires authentication)
    #[instrument(skip(self))]
    pub async fn get_balance(&self) -> Result<Balance, ArbiterError> {
        let token = self.require_auth()?;
        let url = format!("{}/portfolio/balance", self.base_url);

        debug!("Fetching Kalshi portfolio balance");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ArbiterError::network(format!("Failed to fetch balance: {}", e)))?;
        let response = Self::check_status(response, None).await?;

        let balance_response: BalanceResponse = response
            .json()
            .await
            .map_err(|e| ArbiterError::parse(format!("Failed to parse balance: {}", e)))?;

        let balance_usd = Decimal::from(balance_response.balance) / Decimal::from(100);
        Ok(Balance::new(Platform::Kalshi, balance_usd, "USD"))
    }

    /// Fetch the complete fill history (requires authentication).
    ///
    /// All pages are aggregated before returning: partial histories would
    /// produce wrong net quantities downstream.
    #[instrument(skip(self))]
    pub async fn get_fills(&self) -> Result<Vec<Fill>, ArbiterError> {
        let token = self.require_auth()?.to_string();
        let mut fills = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let url = {
                let mut url = format!("{}/portfolio/fills?limit={}", self.base_url, PAGE_LIMIT);
                if let Some(ref c) = cursor {
                    url.push_str(&format!("&cursor={}", c));
                }
                url
            };

            debug!("Fetching Kalshi fills page, cursor: {:?}", cursor);

            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| ArbiterError::network(format!("Failed to fetch fills: {}", e)))?;
            let response = Self::check_status(response, None).await?;

            let fills_response: FillsResponse = response
                .json()
                .await
                .map_err(|e| ArbiterError::parse(format!("Failed to parse fills: {}", e)))?;

            let batch_empty = fills_response.fills.is_empty();
            fills.extend(fills_response.fills.iter().map(|f| f.to_fill()));

            match fills_response.cursor {
                Some(c) if !c.is_empty() && !batch_empty => cursor = Some(c),
                _ => break,
            }
        }

        debug!("Fetched {} Kalshi fills", fills.len());
        Ok(fills)
    }

    /// Fetch the complete settlement history (requires authentication)
    #[instrument(skip(self))]
    pub async fn get_settlements(&self) -> Result<Vec<Settlement>, ArbiterError> {
        let token = self.require_auth()?.to_string();
        let mut settlements = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let url = {
                let mut url = format!(
                    "{}/portfolio/settlements?limit={}",
                    self.base_url, PAGE_LIMIT
                );
                if let Some(ref c) = cursor {
                    url.push_str(&format!("&cursor={}", c));
                }
                url
            };

            debug!("Fetching Kalshi settlements page, cursor: {:?}", cursor);

            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| {
                    ArbiterError::network(format!("Failed to fetch settlements: {}", e))
                })?;
            let response = Self::check_status(response, None).await?;

            let settlements_response: SettlementsResponse = response
                .json()
                .await
                .map_err(|e| ArbiterError::parse(format!("Failed to parse settlements: {}", e)))?;

            let batch_empty = settlements_response.settlements.is_empty();
            settlements.extend(
                settlements_response
                    .settlements
                    .iter()
                    .map(|s| s.to_settlement()),
            );

            match settlements_response.cursor {
                Some(c) if !c.is_empty() && !batch_empty => cursor = Some(c),
                _ => break,
            }
        }

        debug!("Fetched {} Kalshi settlements", settlements.len());
        Ok(settlements)
    }

    /// Reconstruct positions from fill history and settlements.
    ///
    /// Kalshi's native positions endpoint returns empty for many accounts,
    /// so the portfolio is rebuilt from the ground truth: the complete fill
    /// history, settlement payouts, and live quotes for whatever is still
    /// unsettled.
    #[instrument(skip(self))]
    pub async fn positions(&self) -> Result<Vec<Position>, ArbiterError> {
        let fills = self.get_fills().await?;
        let settlements = self.get_settlements().await?;

        let settled: HashSet<&str> = settlements.iter().map(|s| s.market_id.as_str()).collect();

        // Pre-net quantities so quotes are only fetched for markets that
        // will actually appear in the output.
        let mut net: HashMap<&str, i64> = HashMap::new();
        for fill in &fills {
            let signed = match fill.action {
                OrderSide::Buy => i64::from(fill.quantity),
                OrderSide::Sell => -i64::from(fill.quantity),
            };
            *net.entry(fill.market_id.as_str()).or_default() += signed;
        }

        let mut quotes: HashMap<String, MarketQuote> = HashMap::new();
        for (&ticker, &quantity) in &net {
            if quantity == 0 || settled.contains(ticker) {
                continue;
            }
            if let Some(market) = self.get_market_safe(ticker).await {
                quotes.insert(
                    ticker.to_string(),
                    MarketQuote {
                        title: market.title.clone(),
                        mid: market.mid(),
                        status: market.status,
                    },
                );
            }
        }

        Ok(reconcile(Platform::Kalshi, &fills, &settlements, |id| {
            quotes.get(id).cloned()
        }))
    }
}

impl std::fmt::Debug for KalshiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KalshiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.api_key.is_some())
            .finish()
    }
}
