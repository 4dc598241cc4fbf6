//! Inventory metrics computation.

use std::collections::BTreeMap;

use metrics_core::{
    round2, CategoryInventory, Error, InventoryMetricsSnapshot, InventoryMovement, LocationStock,
    MovementKind, Period, Result, StockLevel,
};

use crate::config::CollectorConfig;

/// Computes the inventory snapshot for one store and period.
///
/// Turnover uses the average of the period's opening and closing inventory
/// value, with the opening value reconstructed from the period's movements.
/// A zero average resolves to a turnover of 0, never an error.
pub fn compute(
    store_id: &str,
    period: Period,
    levels: &[StockLevel],
    movements: &[InventoryMovement],
    config: &CollectorConfig,
) -> Result<InventoryMetricsSnapshot> {
    let mut total_value = 0.0;
    let mut total_items = 0u64;
    let mut low_stock = 0u64;
    let mut out_of_stock = 0u64;
    let mut by_location: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    let mut by_category: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    let mut sku_category: BTreeMap<&str, &str> = BTreeMap::new();

    for level in levels {
        if level.unit_value < 0.0 {
            return Err(Error::computation(
                store_id,
                format!("negative unit value on sku {}", level.sku),
            ));
        }
        let value = level.value();
        total_value += value;
        total_items += level.quantity;
        if level.quantity == 0 {
            out_of_stock += 1;
        } else if level.quantity <= config.low_stock_threshold {
            low_stock += 1;
        }

        let l = by_location.entry(level.location.as_str()).or_default();
        l.0 += level.quantity;
        l.1 += value;

        let c = by_category.entry(level.category_id.as_str()).or_default();
        c.0 += level.quantity;
        c.1 += value;

        sku_category.insert(level.sku.as_str(), level.category_id.as_str());
    }

    // COGS per category plus reconstruction of the opening value: closing
    // value minus what came in, plus what went out.
    let mut cogs_total = 0.0;
    let mut cogs_by_category: BTreeMap<&str, f64> = BTreeMap::new();
    let mut net_inbound = 0.0;
    for movement in movements {
        if movement.unit_cost < 0.0 {
            return Err(Error::computation(
                store_id,
                format!("negative unit cost on sku {}", movement.sku),
            ));
        }
        if !period.contains(movement.occurred_at) {
            continue;
        }
        let amount = movement.quantity as f64 * movement.unit_cost;
        match movement.kind {
            MovementKind::Inbound => net_inbound += amount,
            MovementKind::Outbound => {
                cogs_total += amount;
                net_inbound -= amount;
                let category = sku_category
                    .get(movement.sku.as_str())
                    .copied()
                    .unwrap_or("uncategorized");
                *cogs_by_category.entry(category).or_default() += amount;
            }
            MovementKind::Adjustment => {}
        }
    }

    let opening_value = (total_value - net_inbound).max(0.0);
    let average_value = (opening_value + total_value) / 2.0;
    let turnover_rate = turnover(cogs_total, average_value);

    let stock_by_location: Vec<LocationStock> = by_location
        .into_iter()
        .map(|(location, (items_in_stock, value))| LocationStock {
            location: location.to_string(),
            items_in_stock,
            value: round2(value),
        })
        .collect();

    let category_metrics: Vec<CategoryInventory> = by_category
        .into_iter()
        .map(|(category_id, (items_in_stock, value))| {
            let cogs = cogs_by_category.get(category_id).copied().unwrap_or(0.0);
            CategoryInventory {
                category_id: category_id.to_string(),
                items_in_stock,
                value: round2(value),
                // Category average approximated by the closing value; the
                // per-category movement history is not broken down further.
                turnover_rate: turnover(cogs, value),
            }
        })
        .collect();

    Ok(InventoryMetricsSnapshot {
        store_id: store_id.to_string(),
        period_start: period.start,
        period_end: period.end,
        total_inventory_value: round2(total_value),
        total_items_in_stock: total_items,
        low_stock_items: low_stock,
        out_of_stock_items: out_of_stock,
        turnover_rate,
        stock_by_location,
        category_metrics,
    })
}

fn turnover(cogs: f64, average_value: f64) -> f64 {
    if average_value > 0.0 {
        round2(cogs / average_value)
    } else {
        0.0
    }
}
