//! VWAP/MA9 crossover detection.

use chrono::{DateTime, Duration, Utc};
use odte_core::error::SignalError;
use odte_core::types::{NormalizedTick, Signal, SignalDirection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the signal engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEngineConfig {
    /// Minimum seconds between two consecutive emitted signals
    pub cooldown_secs: u64,
}

impl Default for SignalEngineConfig {
    fn default() -> Self {
        Self { cooldown_secs: 30 }
    }
}

impl SignalEngineConfig {
    fn cooldown(&self) -> Duration {
        Duration::seconds(self.cooldown_secs as i64)
    }
}

/// Detects VWAP/MA9 crossovers on consecutive ticks.
///
/// Keeps only the previous tick's delta and a cooldown deadline; everything
/// else is derived from the current sample.
pub struct SignalEngine {
    config: SignalEngineConfig,
    prev_delta: Option<Decimal>,
    last_at: Option<DateTime<Utc>>,
    cooldown_until: Option<DateTime<Utc>>,
}

impl SignalEngine {
    /// Create a new signal engine.
    pub fn new(config: SignalEngineConfig) -> Self {
        Self {
            config,
            prev_delta: None,
            last_at: None,
            cooldown_until: None,
        }
    }

    /// Observe one tick and possibly emit a signal.
    ///
    /// A crossover requires the VWAP-minus-MA9 delta to change sign between
    /// the previous and current tick with both deltas non-zero; a tick
    /// where the two values are exactly equal is treated as not yet
    /// crossed. Non-monotonic ticks are rejected without touching state, so
    /// the engine resumes from the last good tick.
    pub fn on_tick(&mut self, tick: &NormalizedTick) -> Result<Option<Signal>, SignalError> {
        if let Some(prev_at) = self.last_at {
            if tick.at < prev_at {
                return Err(SignalError::NonMonotonicTick {
                    prev: prev_at,
                    at: tick.at,
                });
            }
        }

        let delta = tick.vwap_ma9_delta();
        let signal = match self.prev_delta {
            Some(prev) if Self::crossed(prev, delta) => self.try_emit(tick, prev, delta),
            Some(_) => None,
            None => None,
        };

        self.prev_delta = Some(delta);
        self.last_at = Some(tick.at);
        Ok(signal)
    }

    /// Clear crossover and cooldown state (used between sessions).
    pub fn reset(&mut self) {
        self.prev_delta = None;
        self.last_at = None;
        self.cooldown_until = None;
    }

    /// Time left until the cooldown window closes.
    pub fn remaining_cooldown(&self, now: DateTime<Utc>) -> Duration {
        match self.cooldown_until {
            Some(until) if until > now => until - now,
            _ => Duration::zero(),
        }
    }

    fn crossed(prev: Decimal, now: Decimal) -> bool {
        (prev > Decimal::ZERO && now < Decimal::ZERO)
            || (prev < Decimal::ZERO && now > Decimal::ZERO)
    }

    fn try_emit(
        &mut self,
        tick: &NormalizedTick,
        prev: Decimal,
        delta: Decimal,
    ) -> Option<Signal> {
        if let Some(until) = self.cooldown_until {
            if tick.at < until {
                debug!(at = %tick.at, %until, "crossover suppressed by cooldown");
                return None;
            }
        }
        let option = match &tick.option {
            Some(option) => option,
            None => {
                debug!(at = %tick.at, "crossover without option quote, no target contract");
                return None;
            }
        };

        let direction = if delta > Decimal::ZERO {
            SignalDirection::BullishCrossover
        } else {
            SignalDirection::BearishCrossover
        };
        self.cooldown_until = Some(tick.at + self.config.cooldown());

        Some(Signal {
            at: tick.at,
            direction,
            option_symbol: option.option_symbol.clone(),
            reference_price: option.bid,
            rationale: format!(
                "VWAP/MA9 crossover detected (delta={delta:.4}, prev={prev:.4})"
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use odte_core::types::OptionQuote;
    use rust_decimal_macros::dec;

    fn tick(secs: i64, vwap: Decimal, ma9: Decimal, with_quote: bool) -> NormalizedTick {
        let at = Utc.with_ymd_and_hms(2025, 6, 16, 15, 0, 0).unwrap() + Duration::seconds(secs);
        let option = with_quote.then(|| OptionQuote {
            option_symbol: "QQQ250616C00480000".to_string(),
            strike: dec!(480),
            bid: dec!(1.95),
            ask: dec!(2.05),
            last: dec!(2.00),
            expiry: at,
            at,
        });
        NormalizedTick {
            at,
            symbol: "QQQ".to_string(),
            price: dec!(480.00),
            session_vwap: vwap,
            ma9,
            option,
        }
    }

    #[test]
    fn test_first_tick_never_emits() {
        let mut engine = SignalEngine::new(SignalEngineConfig::default());
        let signal = engine.on_tick(&tick(0, dec!(410), dec!(409), true)).unwrap();
        assert!(signal.is_none());
    }

    #[test]
    fn test_bullish_crossover() {
        let mut engine = SignalEngine::new(SignalEngineConfig::default());
        assert!(engine.on_tick(&tick(0, dec!(409), dec!(410), true)).unwrap().is_none());

        let signal = engine
            .on_tick(&tick(10, dec!(410), dec!(409), true))
            .unwrap()
            .expect("crossover should emit");
        assert_eq!(signal.direction, SignalDirection::BullishCrossover);
        assert_eq!(signal.reference_price, dec!(1.95));
        assert_eq!(signal.option_symbol, "QQQ250616C00480000");
    }

    #[test]
    fn test_bearish_crossover() {
        let mut engine = SignalEngine::new(SignalEngineConfig::default());
        assert!(engine.on_tick(&tick(0, dec!(411), dec!(410), true)).unwrap().is_none());

        let signal = engine
            .on_tick(&tick(10, dec!(409), dec!(410), true))
            .unwrap()
            .expect("crossover should emit");
        assert_eq!(signal.direction, SignalDirection::BearishCrossover);
    }

    #[test]
    fn test_exact_equality_is_not_a_crossover() {
        let mut engine = SignalEngine::new(SignalEngineConfig::default());
        assert!(engine.on_tick(&tick(0, dec!(409), dec!(410), true)).unwrap().is_none());
        // Touches the MA exactly: not yet crossed, but state advances.
        assert!(engine.on_tick(&tick(10, dec!(410), dec!(410), true)).unwrap().is_none());
        // Now above, but the previous delta was zero, so still no signal.
        assert!(engine.on_tick(&tick(20, dec!(411), dec!(410), true)).unwrap().is_none());
    }

    #[test]
    fn test_cooldown_spaces_signals() {
        let mut engine = SignalEngine::new(SignalEngineConfig::default());
        let mut emitted = Vec::new();
        // Flip direction every 10 seconds; only two emissions may survive
        // the 30-second cooldown.
        for i in 0..6i64 {
            let secs = i * 10;
            let (vwap, ma9) = if i % 2 == 0 {
                (dec!(409), dec!(410))
            } else {
                (dec!(410), dec!(409))
            };
            if let Some(signal) = engine.on_tick(&tick(secs, vwap, ma9, true)).unwrap() {
                emitted.push(signal);
            }
        }
        assert_eq!(emitted.len(), 2);
        let spacing = emitted[1].at - emitted[0].at;
        assert!(spacing >= Duration::seconds(30));
    }

    #[test]
    fn test_crossover_without_quote_is_skipped() {
        let mut engine = SignalEngine::new(SignalEngineConfig::default());
        assert!(engine.on_tick(&tick(0, dec!(409), dec!(410), true)).unwrap().is_none());
        // Crossover fires but there is no contract to act on.
        assert!(engine.on_tick(&tick(10, dec!(410), dec!(409), false)).unwrap().is_none());
        // Same side on the next tick: the moment has passed.
        assert!(engine.on_tick(&tick(20, dec!(411), dec!(409), true)).unwrap().is_none());
    }

    #[test]
    fn test_non_monotonic_tick_rejected() {
        let mut engine = SignalEngine::new(SignalEngineConfig::default());
        assert!(engine.on_tick(&tick(10, dec!(409), dec!(410), true)).unwrap().is_none());
        let err = engine.on_tick(&tick(5, dec!(410), dec!(409), true));
        assert!(err.is_err());
        // Engine resumes from the last good tick and still sees the cross.
        let signal = engine.on_tick(&tick(20, dec!(410), dec!(409), true)).unwrap();
        assert!(signal.is_some());
    }

    #[test]
    fn test_remaining_cooldown() {
        let mut engine = SignalEngine::new(SignalEngineConfig::default());
        engine.on_tick(&tick(0, dec!(409), dec!(410), true)).unwrap();
        engine.on_tick(&tick(10, dec!(410), dec!(409), true)).unwrap();
        let now = tick(10, dec!(410), dec!(409), true).at;
        assert_eq!(engine.remaining_cooldown(now), Duration::seconds(30));
        assert_eq!(
            engine.remaining_cooldown(now + Duration::seconds(40)),
            Duration::zero()
        );
    }
}
