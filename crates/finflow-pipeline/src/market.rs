//! Subject market data
//!
//! The upstream data provider is a seam; this module owns:
//! - The retry-with-backoff wrapper for rate-limited providers
//! - Display formatting of metrics (absent fields render `"N/A"`)
//! - Derived technical indicator math (SMA, RSI, annualized volatility)
//!   available to provider implementations

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sentinel rendered for any metric the provider did not supply
pub const NOT_AVAILABLE: &str = "N/A";

/// Market data errors
#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    /// Unknown subject
    #[error("subject not found: {0}")]
    NotFound(String),

    /// Provider rate limit; retried with backoff before surfacing
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other provider failure
    #[error("market data provider error: {0}")]
    Upstream(String),
}

/// Fetches current metrics for one subject
#[async_trait::async_trait]
pub trait SubjectDataProvider: Send + Sync {
    /// Fetch metrics for `subject`
    async fn fetch(&self, subject: &str) -> Result<SubjectMetrics, MarketDataError>;
}

/// Retry policy for rate-limited providers
///
/// Only `RateLimited` triggers a retry; other failures surface immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(5),
        }
    }
}

/// Fetch with exponential backoff on rate limits
///
/// # Errors
/// The last provider error once attempts are exhausted.
pub async fn fetch_with_retry(
    provider: &dyn SubjectDataProvider,
    subject: &str,
    policy: RetryPolicy,
) -> Result<SubjectMetrics, MarketDataError> {
    let mut delay = policy.initial_delay;
    let mut attempt = 1;
    loop {
        match provider.fetch(subject).await {
            Ok(metrics) => return Ok(metrics),
            Err(MarketDataError::RateLimited(_)) if attempt < policy.max_attempts => {
                tracing::warn!(
                    subject,
                    attempt,
                    delay_secs = delay.as_secs(),
                    "rate limit hit, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(subject, error = %e, "market data fetch failed");
                return Err(e);
            }
        }
    }
}

/// Current metrics for a subject; every field is optional
///
/// Derived indicators (moving averages, RSI, volatility) are the
/// provider's responsibility; the helpers at the bottom of this module do
/// the math for providers that only have a price series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectMetrics {
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub profit_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub beta: Option<f64>,
    /// 50-period simple moving average
    pub ma_50: Option<f64>,
    /// 200-period simple moving average
    pub ma_200: Option<f64>,
    /// 14-period relative strength index
    pub rsi_14: Option<f64>,
    /// Annualized volatility from daily returns
    pub annualized_volatility: Option<f64>,
}

impl SubjectMetrics {
    /// Render every metric for display, in a fixed order
    ///
    /// Each field is formatted independently; an absent field renders the
    /// `"N/A"` sentinel instead of failing the report.
    #[must_use]
    pub fn display_fields(&self) -> IndexMap<String, String> {
        let mut fields = IndexMap::new();
        fields.insert("Current Price".to_string(), format_dollars(self.current_price));
        fields.insert("Market Cap".to_string(), format_dollars_grouped(self.market_cap));
        fields.insert("P/E Ratio".to_string(), format_ratio(self.pe_ratio));
        fields.insert(
            "52 Week High".to_string(),
            format_dollars(self.fifty_two_week_high),
        );
        fields.insert(
            "52 Week Low".to_string(),
            format_dollars(self.fifty_two_week_low),
        );
        fields.insert("Volume".to_string(), format_grouped(self.volume));
        fields.insert(
            "Return on Equity".to_string(),
            format_percent(self.return_on_equity),
        );
        fields.insert("Profit Margin".to_string(), format_percent(self.profit_margin));
        fields.insert(
            "Revenue Growth".to_string(),
            format_percent(self.revenue_growth),
        );
        fields.insert("Beta".to_string(), format_ratio(self.beta));
        fields.insert("50 Day MA".to_string(), format_dollars(self.ma_50));
        fields.insert("200 Day MA".to_string(), format_dollars(self.ma_200));
        fields.insert("RSI (14)".to_string(), format_ratio(self.rsi_14));
        fields.insert(
            "Annualized Volatility".to_string(),
            format_percent(self.annualized_volatility),
        );
        fields
    }
}

fn format_dollars(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn format_dollars_grouped(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${}", group_thousands(v)),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn format_grouped(value: Option<f64>) -> String {
    match value {
        Some(v) => group_thousands(v),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Rounds to a whole number and inserts comma separators
fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Simple moving average of the last `period` prices
#[must_use]
pub fn simple_moving_average(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Relative strength index with Wilder smoothing (default period 14)
#[must_use]
pub fn relative_strength_index(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in prices[..=period].windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;

    for pair in prices[period..].windows(2) {
        let delta = pair[1] - pair[0];
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Annualized volatility: std-dev of daily returns scaled by sqrt(252)
#[must_use]
pub fn annualized_volatility(prices: &[f64]) -> Option<f64> {
    if prices.len() < 3 {
        return None;
    }

    let returns: Vec<f64> = prices
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect();
    if returns.len() < 2 {
        return None;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| (r - mean).powi(2))
        .sum::<f64>()
        / (returns.len() as f64 - 1.0);
    Some(variance.sqrt() * 252f64.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn absent_fields_render_sentinel() {
        let fields = SubjectMetrics::default().display_fields();
        assert_eq!(fields.len(), 14);
        assert!(fields.values().all(|v| v == NOT_AVAILABLE));
    }

    #[test]
    fn fields_format_independently() {
        let metrics = SubjectMetrics {
            current_price: Some(187.5),
            market_cap: Some(2_950_000_000_000.0),
            volume: Some(58_000_000.0),
            profit_margin: Some(0.253),
            ..Default::default()
        };
        let fields = metrics.display_fields();

        assert_eq!(fields["Current Price"], "$187.50");
        assert_eq!(fields["Market Cap"], "$2,950,000,000,000");
        assert_eq!(fields["Volume"], "58,000,000");
        assert_eq!(fields["Profit Margin"], "25.30%");
        assert_eq!(fields["P/E Ratio"], NOT_AVAILABLE);
    }

    #[test]
    fn sma_needs_enough_prices() {
        let prices = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(simple_moving_average(&prices, 2), Some(3.5));
        assert_eq!(simple_moving_average(&prices, 5), None);
        assert_eq!(simple_moving_average(&prices, 0), None);
    }

    #[test]
    fn rsi_of_monotone_rise_is_100() {
        let prices: Vec<f64> = (1..=20).map(f64::from).collect();
        assert_eq!(relative_strength_index(&prices, 14), Some(100.0));
    }

    #[test]
    fn rsi_of_flat_series_is_100_by_convention() {
        // No losses at all; RS is unbounded.
        let prices = vec![10.0; 20];
        assert_eq!(relative_strength_index(&prices, 14), Some(100.0));
    }

    #[test]
    fn rsi_is_bounded() {
        let prices = vec![
            44.0, 44.3, 44.1, 43.6, 44.3, 44.8, 45.1, 45.4, 45.8, 46.0, 45.9, 46.2, 46.0, 46.4,
            46.2, 45.6, 46.2, 46.2, 46.0,
        ];
        let rsi = relative_strength_index(&prices, 14).unwrap();
        assert!((0.0..=100.0).contains(&rsi), "rsi out of range: {rsi}");
    }

    #[test]
    fn volatility_of_constant_series_is_zero() {
        let prices = vec![10.0; 30];
        let vol = annualized_volatility(&prices).unwrap();
        assert!(vol.abs() < 1e-12);
    }

    struct FlakyProvider {
        rate_limited_calls: u32,
        calls: AtomicU32,
    }

    #[async_trait::async_trait]
    impl SubjectDataProvider for FlakyProvider {
        async fn fetch(&self, subject: &str) -> Result<SubjectMetrics, MarketDataError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.rate_limited_calls {
                Err(MarketDataError::RateLimited("429".to_string()))
            } else if subject == "MISSING" {
                Err(MarketDataError::NotFound(subject.to_string()))
            } else {
                Ok(SubjectMetrics {
                    current_price: Some(10.0),
                    ..Default::default()
                })
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_from_rate_limits() {
        let provider = FlakyProvider {
            rate_limited_calls: 2,
            calls: AtomicU32::new(0),
        };
        let metrics = fetch_with_retry(&provider, "ACME", RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(metrics.current_price, Some(10.0));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_gives_up_after_max_attempts() {
        let provider = FlakyProvider {
            rate_limited_calls: 10,
            calls: AtomicU32::new(0),
        };
        let err = fetch_with_retry(&provider, "ACME", RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_rate_limit_errors_surface_immediately() {
        let provider = FlakyProvider {
            rate_limited_calls: 0,
            calls: AtomicU32::new(0),
        };
        let err = fetch_with_retry(&provider, "MISSING", RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::NotFound(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
