//! Option quote polling while a position is open.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use odte_core::traits::QuoteSource;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::events::EngineEvent;

/// Polling and retry parameters for the quote monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Delay between successful polls
    pub poll_interval: Duration,
    /// Consecutive failures before quotes are reported degraded
    pub retry_budget: u32,
    /// First retry delay; doubles per consecutive failure
    pub backoff_base: Duration,
    /// Upper bound on the retry delay
    pub backoff_cap: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            retry_budget: 5,
            backoff_base: Duration::from_millis(500),
            backoff_cap: Duration::from_secs(10),
        }
    }
}

/// Continuously refreshes quotes for the open option position.
///
/// Holds no notion of whether a position exists: the manager arms it on an
/// entry fill and disarms it on an exit fill. The polling task runs off the
/// manager's serialization point and only hands results back over the event
/// channel.
pub struct QuoteMonitor {
    source: Arc<dyn QuoteSource>,
    events: mpsc::Sender<EngineEvent>,
    config: MonitorConfig,
    task: Option<(String, JoinHandle<()>)>,
}

impl QuoteMonitor {
    /// Create a monitor over the given quote source.
    pub fn new(
        source: Arc<dyn QuoteSource>,
        events: mpsc::Sender<EngineEvent>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            events,
            config,
            task: None,
        }
    }

    /// Start polling quotes for `option_symbol`. A no-op if already armed
    /// for the same contract; re-arms if armed for a different one.
    pub fn arm(&mut self, option_symbol: &str) {
        if let Some((active, _)) = &self.task {
            if active == option_symbol {
                return;
            }
        }
        self.disarm();
        info!(symbol = option_symbol, "quote monitor armed");
        let handle = tokio::spawn(poll_loop(
            self.source.clone(),
            option_symbol.to_string(),
            self.events.clone(),
            self.config.clone(),
        ));
        self.task = Some((option_symbol.to_string(), handle));
    }

    /// Stop polling. Takes effect immediately: the polling task is aborted
    /// before this returns.
    pub fn disarm(&mut self) {
        if let Some((symbol, handle)) = self.task.take() {
            handle.abort();
            info!(symbol = symbol.as_str(), "quote monitor disarmed");
        }
    }

    /// Whether a polling task is currently running.
    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for QuoteMonitor {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.task.take() {
            handle.abort();
        }
    }
}

async fn poll_loop(
    source: Arc<dyn QuoteSource>,
    symbol: String,
    events: mpsc::Sender<EngineEvent>,
    config: MonitorConfig,
) {
    let mut failures: u32 = 0;
    let mut degraded_reported = false;
    loop {
        match source.fetch_option_quote(&symbol).await {
            Ok(quote) => {
                failures = 0;
                degraded_reported = false;
                if events.send(EngineEvent::Quote(quote)).await.is_err() {
                    debug!(symbol = symbol.as_str(), "engine gone, poll loop exiting");
                    break;
                }
                tokio::time::sleep(config.poll_interval).await;
            }
            Err(err) => {
                failures += 1;
                warn!(symbol = symbol.as_str(), %err, failures, "option quote poll failed");
                if failures >= config.retry_budget {
                    if !degraded_reported {
                        degraded_reported = true;
                        let degraded = EngineEvent::QuotesDegraded {
                            option_symbol: symbol.clone(),
                            at: Utc::now(),
                        };
                        if events.send(degraded).await.is_err() {
                            break;
                        }
                    }
                    // Budget exhausted and surfaced; keep trying at the
                    // normal cadence so a recovery clears degradation.
                    tokio::time::sleep(config.poll_interval).await;
                } else {
                    let exp = failures.saturating_sub(1).min(16);
                    let delay = config
                        .backoff_base
                        .saturating_mul(1u32 << exp)
                        .min(config.backoff_cap);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use odte_core::error::BrokerError;
    use odte_core::types::OptionQuote;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyQuoteSource {
        calls: AtomicU32,
        fail_first: u32,
    }

    #[async_trait]
    impl QuoteSource for FlakyQuoteSource {
        async fn fetch_option_quote(
            &self,
            option_symbol: &str,
        ) -> Result<OptionQuote, BrokerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(BrokerError::Network("connection reset".into()));
            }
            let now = Utc::now();
            Ok(OptionQuote {
                option_symbol: option_symbol.to_string(),
                strike: dec!(480),
                bid: dec!(1.90),
                ask: dec!(2.10),
                last: dec!(2.00),
                expiry: now,
                at: now,
            })
        }
    }

    fn fast_config() -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_millis(5),
            retry_budget: 3,
            backoff_base: Duration::from_millis(1),
            backoff_cap: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn test_monitor_delivers_quotes() {
        let (tx, mut rx) = mpsc::channel(16);
        let source = Arc::new(FlakyQuoteSource {
            calls: AtomicU32::new(0),
            fail_first: 0,
        });
        let mut monitor = QuoteMonitor::new(source, tx, fast_config());

        monitor.arm("QQQ250808C00480000");
        assert!(monitor.is_armed());

        match rx.recv().await {
            Some(EngineEvent::Quote(quote)) => {
                assert_eq!(quote.option_symbol, "QQQ250808C00480000");
            }
            other => panic!("expected a quote, got {other:?}"),
        }
        monitor.disarm();
        assert!(!monitor.is_armed());
    }

    #[tokio::test]
    async fn test_monitor_surfaces_degradation_then_recovers() {
        let (tx, mut rx) = mpsc::channel(16);
        let source = Arc::new(FlakyQuoteSource {
            calls: AtomicU32::new(0),
            fail_first: 3,
        });
        let mut monitor = QuoteMonitor::new(source, tx, fast_config());

        monitor.arm("QQQ250808C00480000");

        match rx.recv().await {
            Some(EngineEvent::QuotesDegraded { option_symbol, .. }) => {
                assert_eq!(option_symbol, "QQQ250808C00480000");
            }
            other => panic!("expected degradation first, got {other:?}"),
        }
        // The next successful poll flows through as a normal quote.
        match rx.recv().await {
            Some(EngineEvent::Quote(_)) => {}
            other => panic!("expected recovery quote, got {other:?}"),
        }
        monitor.disarm();
    }

    #[tokio::test]
    async fn test_rearming_same_symbol_is_a_noop() {
        let (tx, _rx) = mpsc::channel(16);
        let source = Arc::new(FlakyQuoteSource {
            calls: AtomicU32::new(0),
            fail_first: 0,
        });
        let mut monitor = QuoteMonitor::new(source, tx, fast_config());

        monitor.arm("QQQ250808C00480000");
        monitor.arm("QQQ250808C00480000");
        assert!(monitor.is_armed());
        monitor.disarm();
    }
}
