//! Collector configuration.

use serde::{Deserialize, Serialize};

/// Thresholds and limits for metric computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Maximum entries kept in `top_products`.
    #[serde(default = "default_top_products_limit")]
    pub top_products_limit: usize,
    /// Stock at or below this count is flagged low (zero is out-of-stock).
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u64,
}

fn default_top_products_limit() -> usize {
    10
}

fn default_low_stock_threshold() -> u64 {
    5
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            top_products_limit: default_top_products_limit(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}
