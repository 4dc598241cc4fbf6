//! Sales metrics computation.

use std::collections::BTreeMap;

use metrics_core::{
    round2, CategorySales, Error, Order, Period, ProductSales, Result, SalesMetricsSnapshot,
};

use crate::config::CollectorConfig;

/// Computes the sales snapshot for one store and period.
///
/// Pure function of its inputs. Grouping uses ordered maps and the final
/// lists are sorted with a total order, so identical inputs always produce
/// an identical snapshot.
pub fn compute(
    store_id: &str,
    period: Period,
    orders: &[Order],
    views: u64,
    config: &CollectorConfig,
) -> Result<SalesMetricsSnapshot> {
    let mut total_revenue = 0.0;
    let mut total_orders = 0u64;
    let mut total_units = 0u64;
    let mut by_product: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    let mut by_category: BTreeMap<&str, (u64, f64)> = BTreeMap::new();

    for order in orders {
        if !order.status.is_counted() || !period.contains(order.created_at) {
            continue;
        }
        total_orders += 1;
        for item in &order.line_items {
            if item.unit_price < 0.0 {
                return Err(Error::computation(
                    store_id,
                    format!("negative unit price on product {}", item.product_id),
                ));
            }
            let revenue = item.revenue();
            total_revenue += revenue;
            total_units += item.quantity;

            let p = by_product.entry(item.product_id.as_str()).or_default();
            p.0 += item.quantity;
            p.1 += revenue;

            let c = by_category.entry(item.category_id.as_str()).or_default();
            c.0 += item.quantity;
            c.1 += revenue;
        }
    }

    let mut top_products: Vec<ProductSales> = by_product
        .into_iter()
        .map(|(product_id, (units_sold, revenue))| ProductSales {
            product_id: product_id.to_string(),
            units_sold,
            revenue: round2(revenue),
        })
        .collect();
    // Revenue descending, product id ascending on ties. The map iteration is
    // already id-ascending, and the sort is stable.
    top_products.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    top_products.truncate(config.top_products_limit);

    let mut sales_by_category: Vec<CategorySales> = by_category
        .into_iter()
        .map(|(category_id, (units_sold, revenue))| CategorySales {
            category_id: category_id.to_string(),
            units_sold,
            revenue: round2(revenue),
        })
        .collect();
    sales_by_category.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));

    let average_order_value = if total_orders > 0 {
        round2(total_revenue / total_orders as f64)
    } else {
        0.0
    };
    // Under-instrumented stores can report fewer views than orders; the
    // persisted rate stays within [0, 100].
    let conversion_rate = if views > 0 {
        round2((total_orders as f64 / views as f64 * 100.0).min(100.0))
    } else {
        0.0
    };

    Ok(SalesMetricsSnapshot {
        store_id: store_id.to_string(),
        period_start: period.start,
        period_end: period.end,
        total_revenue: round2(total_revenue),
        total_orders,
        total_units_sold: total_units,
        average_order_value,
        top_products,
        sales_by_category,
        conversion_rate,
        views,
    })
}
