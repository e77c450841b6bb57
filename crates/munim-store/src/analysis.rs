//! Pure aggregation over store records.
//!
//! These run on data already loaded from a `RecordStore`, so they stay
//! synchronous and deterministic.

use munim_core::types::{InventoryItem, Order};

/// Revenue and profit for one calendar day.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyProfit {
    /// ISO date, e.g. "2026-08-29".
    pub date: String,
    pub revenue: f64,
    pub profit: f64,
}

/// Profit breakdown over a window of orders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfitReport {
    pub daily: Vec<DailyProfit>,
    pub total_revenue: f64,
    pub total_profit: f64,
    /// Profit as a percentage of revenue; 0 when there is no revenue.
    pub average_margin: f64,
}

/// Group orders by calendar date of creation and total them up.
pub fn profit_analysis(orders: &[Order]) -> ProfitReport {
    let mut daily: Vec<DailyProfit> = Vec::new();

    for order in orders {
        let date = order.created_at.format("%Y-%m-%d").to_string();
        match daily.iter_mut().find(|d| d.date == date) {
            Some(day) => {
                day.revenue += order.total;
                day.profit += order.profit;
            }
            None => daily.push(DailyProfit {
                date,
                revenue: order.total,
                profit: order.profit,
            }),
        }
    }
    daily.sort_by(|a, b| a.date.cmp(&b.date));

    let total_revenue: f64 = daily.iter().map(|d| d.revenue).sum();
    let total_profit: f64 = daily.iter().map(|d| d.profit).sum();
    let average_margin = if total_revenue > 0.0 {
        (total_profit / total_revenue) * 100.0
    } else {
        0.0
    };

    ProfitReport {
        daily,
        total_revenue,
        total_profit,
        average_margin,
    }
}

/// Shop-wide inventory aggregates.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryStats {
    pub total_items: usize,
    /// Sum of quantity times sell price across all rows.
    pub total_value: f64,
    pub low_stock_count: usize,
}

/// Aggregate counts and value over the inventory.
pub fn inventory_stats(items: &[InventoryItem], default_reorder_point: f64) -> InventoryStats {
    InventoryStats {
        total_items: items.len(),
        total_value: items.iter().map(|i| i.quantity * i.sell_price).sum(),
        low_stock_count: items
            .iter()
            .filter(|i| i.is_low(default_reorder_point))
            .count(),
    }
}
