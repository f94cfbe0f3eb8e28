//! Exit trigger evaluation.

use odte_core::types::Position;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why an open position is being closed.
///
/// Variant order is the priority order when several triggers are satisfied
/// in the same evaluation cycle; `Shutdown` only comes from an explicit
/// close-all and never competes with the market-driven triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitReason {
    /// Session close plus buffer reached
    SessionClose,
    /// Buy-back price rose to the stop-loss
    StopLoss,
    /// Buy-back price fell to the take-profit
    TakeProfit,
    /// Crossover in the opposite direction
    ReverseSignal,
    /// Operator or process shutdown
    Shutdown,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::SessionClose => write!(f, "session-close"),
            ExitReason::StopLoss => write!(f, "stop-loss"),
            ExitReason::TakeProfit => write!(f, "take-profit"),
            ExitReason::ReverseSignal => write!(f, "reverse-signal"),
            ExitReason::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Inputs for one exit evaluation cycle.
#[derive(Debug, Clone, Default)]
pub struct ExitContext {
    /// Latest buy-back mark (quote mid), if quotes are flowing
    pub mark: Option<Decimal>,
    /// True once the session close plus buffer has been reached
    pub past_session_cutoff: bool,
    /// True while the quote monitor has exhausted its retry budget;
    /// price triggers must not fire on stale data
    pub quotes_degraded: bool,
    /// True when a reverse-direction signal arrived this cycle
    pub reverse_signal: bool,
}

/// Return the highest-priority satisfied exit trigger, if any.
pub fn evaluate_exit(position: &Position, cx: &ExitContext) -> Option<ExitReason> {
    if cx.past_session_cutoff {
        return Some(ExitReason::SessionClose);
    }
    if !cx.quotes_degraded {
        if let Some(mark) = cx.mark {
            if mark >= position.stop_loss {
                return Some(ExitReason::StopLoss);
            }
            if mark <= position.take_profit {
                return Some(ExitReason::TakeProfit);
            }
        }
    }
    if cx.reverse_signal {
        return Some(ExitReason::ReverseSignal);
    }
    None
}
