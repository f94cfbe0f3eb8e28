//! Order sink notification types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TradeIntent;

/// Terminal outcome of a submitted trade intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStatus {
    /// Order filled completely
    Filled {
        price: Decimal,
        at: DateTime<Utc>,
    },
    /// Order rejected by the broker
    Rejected { reason: String },
}

/// Asynchronous fill/rejection notification from the order sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    /// ID of the trade intent this update settles
    pub intent_id: Uuid,
    /// Fill or rejection
    pub status: FillStatus,
}

impl OrderUpdate {
    /// Create a fill notification.
    pub fn filled(intent_id: Uuid, price: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            intent_id,
            status: FillStatus::Filled { price, at },
        }
    }

    /// Create a rejection notification.
    pub fn rejected(intent_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            intent_id,
            status: FillStatus::Rejected {
                reason: reason.into(),
            },
        }
    }
}

/// Audit record of a fill, observable by the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExecution {
    /// The intent that produced this execution
    pub intent: TradeIntent,
    /// Price the order filled at
    pub fill_price: Decimal,
    /// Realized P/L contribution (zero for entries)
    pub pnl_contrib: Decimal,
    /// Fill timestamp
    pub at: DateTime<Utc>,
}
