//! # Report Reductions
//!
//! Pure joins and reductions over orders, payments, products and expenses.
//! The reporting service loads the rows; everything here is deterministic
//! arithmetic over slices.
//!
//! ## Report Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Reporting Data Flow                                │
//! │                                                                         │
//! │  opsdesk-db repositories                                               │
//! │       │  (orders, items, payments, products, expenses for a range)     │
//! │       ▼                                                                 │
//! │  opsdesk-core::reports  ← THIS MODULE (pure reductions)                │
//! │       │                                                                 │
//! │       ├── revenue_summary()     billed / collected / outstanding / net │
//! │       ├── daily_revenue_trend() chart points per day                   │
//! │       ├── top_products()        ranked by revenue                      │
//! │       ├── product_profit()      revenue − cost × qty per product       │
//! │       ├── customer_balances()   who still owes what                    │
//! │       └── status_breakdown()    pipeline histogram                     │
//! │       ▼                                                                 │
//! │  Frontend charts / tables                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Expense, Order, OrderItem, OrderStatus, Payment, Product, STATUS_PIPELINE};

// =============================================================================
// Payment Aggregation
// =============================================================================

/// Sum of non-voided, non-refunded payments.
pub fn total_paid(payments: &[Payment]) -> Money {
    payments
        .iter()
        .filter(|p| p.status.counts_toward_total())
        .map(|p| p.amount())
        .sum()
}

/// Outstanding balance: order total − total paid.
///
/// Signed: a negative result means the order is overpaid. UI-facing stats
/// clamp at zero via [`Money::clamp_zero`].
pub fn outstanding(total_cents: i64, payments: &[Payment]) -> Money {
    Money::from_cents(total_cents) - total_paid(payments)
}

// =============================================================================
// Revenue Summary
// =============================================================================

/// Headline figures for a reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevenueSummary {
    /// Orders in the period, excluding cancelled ones.
    pub order_count: usize,
    /// Sum of order totals over non-cancelled orders.
    pub billed_cents: i64,
    /// Sum of completed payments.
    pub collected_cents: i64,
    /// billed − collected (clamped at zero for display).
    pub outstanding_cents: i64,
    /// Sum of expenses in the period.
    pub expense_cents: i64,
    /// collected − expenses.
    pub net_cents: i64,
}

/// Reduces a period's orders, payments and expenses to headline figures.
pub fn revenue_summary(
    orders: &[Order],
    payments: &[Payment],
    expenses: &[Expense],
) -> RevenueSummary {
    let billable: Vec<&Order> = orders.iter().filter(|o| o.status.is_billable()).collect();

    let billed: Money = billable.iter().map(|o| o.total()).sum();
    let collected = total_paid(payments);
    let expense_total: Money = expenses.iter().map(|e| e.amount()).sum();

    RevenueSummary {
        order_count: billable.len(),
        billed_cents: billed.cents(),
        collected_cents: collected.cents(),
        outstanding_cents: (billed - collected).clamp_zero().cents(),
        expense_cents: expense_total.cents(),
        net_cents: (collected - expense_total).cents(),
    }
}

// =============================================================================
// Trends
// =============================================================================

/// One chart point of a revenue trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendPoint {
    /// Bucket label: `YYYY-MM-DD` for daily, `YYYY-MM` for monthly.
    pub bucket: String,
    pub revenue_cents: i64,
    pub order_count: usize,
}

/// Billed revenue per day over the trailing `days` days (inclusive of
/// `today`). Days without orders produce zero points so charts have a
/// continuous axis.
pub fn daily_revenue_trend(orders: &[Order], today: NaiveDate, days: u32) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, (i64, usize)> = BTreeMap::new();

    for offset in 0..days {
        if let Some(day) = today.checked_sub_days(chrono::Days::new(offset as u64)) {
            buckets.insert(day, (0, 0));
        }
    }

    for order in orders.iter().filter(|o| o.status.is_billable()) {
        let day = order.created_at.date_naive();
        if let Some((revenue, count)) = buckets.get_mut(&day) {
            *revenue += order.total_cents;
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(day, (revenue_cents, order_count))| TrendPoint {
            bucket: day.format("%Y-%m-%d").to_string(),
            revenue_cents,
            order_count,
        })
        .collect()
}

/// Billed revenue per calendar month over the trailing `months` months.
pub fn monthly_revenue_trend(orders: &[Order], today: NaiveDate, months: u32) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<(i32, u32), (i64, usize)> = BTreeMap::new();

    let mut year = today.year();
    let mut month = today.month();
    for _ in 0..months {
        buckets.insert((year, month), (0, 0));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    for order in orders.iter().filter(|o| o.status.is_billable()) {
        let date = order.created_at.date_naive();
        if let Some((revenue, count)) = buckets.get_mut(&(date.year(), date.month())) {
            *revenue += order.total_cents;
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|((y, m), (revenue_cents, order_count))| TrendPoint {
            bucket: format!("{y:04}-{m:02}"),
            revenue_cents,
            order_count,
        })
        .collect()
}

// =============================================================================
// Product Rankings
// =============================================================================

/// A product's aggregated sales figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSales {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// Ranks products by line-item revenue, descending, truncated to `limit`.
///
/// Uses the frozen name snapshots so renamed products report under the
/// name they were sold as.
pub fn top_products(items: &[OrderItem], limit: usize) -> Vec<ProductSales> {
    let mut by_product: BTreeMap<&str, ProductSales> = BTreeMap::new();

    for item in items {
        let entry = by_product
            .entry(item.product_id.as_str())
            .or_insert_with(|| ProductSales {
                product_id: item.product_id.clone(),
                name: item.name_snapshot.clone(),
                quantity: 0,
                revenue_cents: 0,
            });
        entry.quantity += item.quantity;
        entry.revenue_cents += item.line_total_cents;
    }

    let mut ranked: Vec<ProductSales> = by_product.into_values().collect();
    ranked.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));
    ranked.truncate(limit);
    ranked
}

/// Per-product profit: revenue − cost × quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductProfit {
    pub product_id: String,
    pub name: String,
    pub revenue_cents: i64,
    pub cost_cents: i64,
    pub profit_cents: i64,
}

/// Joins order items against the product catalog to compute per-product
/// profit. Products without a recorded cost contribute zero cost (profit
/// equals revenue); items referencing unknown products are skipped.
pub fn product_profit(items: &[OrderItem], products: &[Product]) -> Vec<ProductProfit> {
    let catalog: BTreeMap<&str, &Product> =
        products.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut by_product: BTreeMap<&str, ProductProfit> = BTreeMap::new();

    for item in items {
        let Some(product) = catalog.get(item.product_id.as_str()) else {
            continue;
        };
        let unit_cost = product.cost_cents.unwrap_or(0);

        let entry = by_product
            .entry(item.product_id.as_str())
            .or_insert_with(|| ProductProfit {
                product_id: item.product_id.clone(),
                name: item.name_snapshot.clone(),
                revenue_cents: 0,
                cost_cents: 0,
                profit_cents: 0,
            });
        entry.revenue_cents += item.line_total_cents;
        entry.cost_cents += unit_cost * item.quantity;
    }

    let mut result: Vec<ProductProfit> = by_product
        .into_values()
        .map(|mut p| {
            p.profit_cents = p.revenue_cents - p.cost_cents;
            p
        })
        .collect();
    result.sort_by(|a, b| b.profit_cents.cmp(&a.profit_cents));
    result
}

// =============================================================================
// Customer Balances
// =============================================================================

/// A customer's billed/paid position over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerBalance {
    /// `None` for walk-in orders without a customer record.
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub billed_cents: i64,
    pub paid_cents: i64,
    pub outstanding_cents: i64,
}

/// Per-customer outstanding balances, largest debt first.
///
/// Joins payments to orders, groups billable orders by customer (walk-in
/// orders group by name), and keeps only customers that still owe money.
pub fn customer_balances(orders: &[Order], payments: &[Payment]) -> Vec<CustomerBalance> {
    let mut paid_by_order: BTreeMap<&str, i64> = BTreeMap::new();
    for payment in payments.iter().filter(|p| p.status.counts_toward_total()) {
        *paid_by_order.entry(payment.order_id.as_str()).or_insert(0) += payment.amount_cents;
    }

    let mut by_customer: BTreeMap<String, CustomerBalance> = BTreeMap::new();
    for order in orders.iter().filter(|o| o.status.is_billable()) {
        let key = match &order.customer_id {
            Some(id) => id.clone(),
            None => format!("walk-in:{}", order.customer_name),
        };
        let entry = by_customer.entry(key).or_insert_with(|| CustomerBalance {
            customer_id: order.customer_id.clone(),
            customer_name: order.customer_name.clone(),
            billed_cents: 0,
            paid_cents: 0,
            outstanding_cents: 0,
        });
        entry.billed_cents += order.total_cents;
        entry.paid_cents += paid_by_order.get(order.id.as_str()).copied().unwrap_or(0);
    }

    let mut balances: Vec<CustomerBalance> = by_customer
        .into_values()
        .map(|mut balance| {
            balance.outstanding_cents = (Money::from_cents(balance.billed_cents)
                - Money::from_cents(balance.paid_cents))
            .clamp_zero()
            .cents();
            balance
        })
        .filter(|balance| balance.outstanding_cents > 0)
        .collect();
    balances.sort_by(|a, b| b.outstanding_cents.cmp(&a.outstanding_cents));
    balances
}

// =============================================================================
// Status Breakdown
// =============================================================================

/// Histogram bucket for the pipeline view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// Counts orders per pipeline status (cancelled included as a final
/// bucket), preserving pipeline order for display.
pub fn status_breakdown(orders: &[Order]) -> Vec<StatusCount> {
    STATUS_PIPELINE
        .iter()
        .copied()
        .chain(std::iter::once(OrderStatus::Cancelled))
        .map(|status| StatusCount {
            status,
            count: orders.iter().filter(|o| o.status == status).count(),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, PaymentStatus};
    use chrono::{DateTime, Utc};

    fn order(id: &str, status: OrderStatus, total: i64, created: &str) -> Order {
        let created_at = format!("{created}T12:00:00Z")
            .parse::<DateTime<Utc>>()
            .unwrap();
        Order {
            id: id.to_string(),
            order_number: format!("260830{:03}", 1),
            customer_id: None,
            customer_name: "Acme".to_string(),
            status,
            total_cents: total,
            notes: None,
            created_by: "u1".to_string(),
            created_at,
            updated_at: created_at,
            completed_at: None,
        }
    }

    fn payment(order_id: &str, status: PaymentStatus, amount: i64) -> Payment {
        Payment {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            method: PaymentMethod::Cash,
            status,
            amount_cents: amount,
            reference: None,
            notes: None,
            recorded_by: "u1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(product_id: &str, name: &str, qty: i64, unit_price: i64) -> OrderItem {
        OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: "o1".to_string(),
            product_id: product_id.to_string(),
            name_snapshot: name.to_string(),
            unit_price_cents: unit_price,
            quantity: qty,
            line_total_cents: qty * unit_price,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_paid_skips_voided_and_refunded() {
        let payments = vec![
            payment("o1", PaymentStatus::Completed, 1000),
            payment("o1", PaymentStatus::Voided, 400),
            payment("o1", PaymentStatus::Refunded, 300),
            payment("o1", PaymentStatus::Completed, 500),
        ];
        assert_eq!(total_paid(&payments).cents(), 1500);
    }

    #[test]
    fn test_outstanding_can_go_negative() {
        let payments = vec![payment("o1", PaymentStatus::Completed, 1200)];
        assert_eq!(outstanding(1000, &payments).cents(), -200);
        assert_eq!(outstanding(1000, &payments).clamp_zero().cents(), 0);
    }

    #[test]
    fn test_revenue_summary_excludes_cancelled() {
        let orders = vec![
            order("o1", OrderStatus::Completed, 10000, "2026-08-29"),
            order("o2", OrderStatus::InProgress, 5000, "2026-08-30"),
            order("o3", OrderStatus::Cancelled, 7000, "2026-08-30"),
        ];
        let payments = vec![
            payment("o1", PaymentStatus::Completed, 10000),
            payment("o2", PaymentStatus::Completed, 2000),
        ];
        let expenses = vec![Expense {
            id: "e1".to_string(),
            category: "rent".to_string(),
            description: None,
            amount_cents: 3000,
            incurred_on: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            created_by: "u1".to_string(),
            created_at: Utc::now(),
        }];

        let summary = revenue_summary(&orders, &payments, &expenses);
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.billed_cents, 15000);
        assert_eq!(summary.collected_cents, 12000);
        assert_eq!(summary.outstanding_cents, 3000);
        assert_eq!(summary.expense_cents, 3000);
        assert_eq!(summary.net_cents, 9000);
    }

    #[test]
    fn test_daily_trend_has_continuous_axis() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let orders = vec![
            order("o1", OrderStatus::Completed, 1000, "2026-08-30"),
            order("o2", OrderStatus::Received, 2000, "2026-08-28"),
            order("o3", OrderStatus::Cancelled, 9000, "2026-08-30"),
        ];

        let trend = daily_revenue_trend(&orders, today, 3);
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].bucket, "2026-08-28");
        assert_eq!(trend[0].revenue_cents, 2000);
        assert_eq!(trend[1].bucket, "2026-08-29");
        assert_eq!(trend[1].revenue_cents, 0);
        assert_eq!(trend[2].bucket, "2026-08-30");
        assert_eq!(trend[2].revenue_cents, 1000);
        assert_eq!(trend[2].order_count, 1);
    }

    #[test]
    fn test_monthly_trend_spans_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let orders = vec![order("o1", OrderStatus::Completed, 4000, "2025-12-20")];

        let trend = monthly_revenue_trend(&orders, today, 2);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].bucket, "2025-12");
        assert_eq!(trend[0].revenue_cents, 4000);
        assert_eq!(trend[1].bucket, "2026-01");
        assert_eq!(trend[1].revenue_cents, 0);
    }

    #[test]
    fn test_top_products_ranked_by_revenue() {
        let items = vec![
            item("p1", "Widget", 2, 500),
            item("p2", "Gadget", 1, 5000),
            item("p1", "Widget", 3, 500),
        ];

        let ranked = top_products(&items, 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].product_id, "p2");
        assert_eq!(ranked[0].revenue_cents, 5000);
        assert_eq!(ranked[1].product_id, "p1");
        assert_eq!(ranked[1].quantity, 5);
        assert_eq!(ranked[1].revenue_cents, 2500);
    }

    #[test]
    fn test_top_products_respects_limit() {
        let items = vec![
            item("p1", "A", 1, 100),
            item("p2", "B", 1, 200),
            item("p3", "C", 1, 300),
        ];
        assert_eq!(top_products(&items, 2).len(), 2);
    }

    #[test]
    fn test_product_profit_joins_catalog_cost() {
        let now = Utc::now();
        let products = vec![Product {
            id: "p1".to_string(),
            sku: "WID-01".to_string(),
            name: "Widget".to_string(),
            description: None,
            price_cents: 500,
            cost_cents: Some(300),
            is_active: true,
            created_at: now,
            updated_at: now,
        }];
        let items = vec![item("p1", "Widget", 4, 500), item("p-gone", "Ghost", 1, 100)];

        let profit = product_profit(&items, &products);
        assert_eq!(profit.len(), 1);
        assert_eq!(profit[0].revenue_cents, 2000);
        assert_eq!(profit[0].cost_cents, 1200);
        assert_eq!(profit[0].profit_cents, 800);
    }

    #[test]
    fn test_customer_balances_groups_and_ranks_by_debt() {
        let mut o1 = order("o1", OrderStatus::Completed, 10000, "2026-08-29");
        o1.customer_id = Some("c1".to_string());
        o1.customer_name = "Beta BV".to_string();
        let mut o2 = order("o2", OrderStatus::InProgress, 4000, "2026-08-30");
        o2.customer_id = Some("c1".to_string());
        o2.customer_name = "Beta BV".to_string();
        // Walk-in order, fully paid: should drop out
        let o3 = order("o3", OrderStatus::Completed, 2000, "2026-08-30");
        // Cancelled: never billed
        let mut o4 = order("o4", OrderStatus::Cancelled, 9000, "2026-08-30");
        o4.customer_id = Some("c2".to_string());

        let payments = vec![
            payment("o1", PaymentStatus::Completed, 6000),
            payment("o2", PaymentStatus::Voided, 4000),
            payment("o3", PaymentStatus::Completed, 2000),
        ];

        let balances = customer_balances(&[o1, o2, o3, o4], &payments);
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].customer_id.as_deref(), Some("c1"));
        assert_eq!(balances[0].billed_cents, 14000);
        assert_eq!(balances[0].paid_cents, 6000);
        assert_eq!(balances[0].outstanding_cents, 8000);
    }

    #[test]
    fn test_customer_balances_clamps_overpayment() {
        let mut o1 = order("o1", OrderStatus::Completed, 1000, "2026-08-30");
        o1.customer_id = Some("c1".to_string());
        let payments = vec![payment("o1", PaymentStatus::Completed, 1500)];

        assert!(customer_balances(&[o1], &payments).is_empty());
    }

    #[test]
    fn test_status_breakdown_preserves_pipeline_order() {
        let orders = vec![
            order("o1", OrderStatus::Received, 100, "2026-08-30"),
            order("o2", OrderStatus::Received, 100, "2026-08-30"),
            order("o3", OrderStatus::Cancelled, 100, "2026-08-30"),
        ];
        let breakdown = status_breakdown(&orders);
        assert_eq!(breakdown.len(), 7);
        assert_eq!(breakdown[0].status, OrderStatus::Received);
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[6].status, OrderStatus::Cancelled);
        assert_eq!(breakdown[6].count, 1);
    }
}
