//! Customer segmentation thresholds.
//!
//! Buckets are static and intentionally coarse; they exist so the dashboard
//! can slice customers consistently across periods, not to be a CRM.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::records::CustomerHistory;

/// Days without an order before a repeat customer counts as at-risk.
pub const AT_RISK_AFTER_DAYS: i64 = 90;

/// Lifetime order counts for the loyalty tiers.
pub const VIP_MIN_ORDERS: u64 = 10;
pub const LOYAL_MIN_ORDERS: u64 = 4;
pub const ACTIVE_MIN_ORDERS: u64 = 2;

/// Customer segment buckets, by lifetime order count and recency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    /// >= 10 lifetime orders.
    Vip,
    /// 4-9 lifetime orders.
    Loyal,
    /// 2-3 lifetime orders.
    Active,
    /// Exactly one order.
    New,
    /// Repeat customer with no order in the last 90 days.
    AtRisk,
}

impl CustomerSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vip => "vip",
            Self::Loyal => "loyal",
            Self::Active => "active",
            Self::New => "new",
            Self::AtRisk => "at_risk",
        }
    }

    /// Classifies a customer as of `as_of` (normally the period end).
    ///
    /// Recency wins over loyalty tier: a lapsed VIP is at-risk, which is the
    /// bucket an operator would act on.
    pub fn classify(history: &CustomerHistory, as_of: DateTime<Utc>) -> Self {
        let lapsed = as_of - history.last_order_at > Duration::days(AT_RISK_AFTER_DAYS);
        if history.lifetime_orders > 1 && lapsed {
            return Self::AtRisk;
        }
        match history.lifetime_orders {
            n if n >= VIP_MIN_ORDERS => Self::Vip,
            n if n >= LOYAL_MIN_ORDERS => Self::Loyal,
            n if n >= ACTIVE_MIN_ORDERS => Self::Active,
            _ => Self::New,
        }
    }
}

impl std::fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
