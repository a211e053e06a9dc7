//! # Reporting Service
//!
//! Loads the rows a report needs and hands them to the pure reductions in
//! opsdesk-core. All reports are gated on the `view_reports` capability.
//!
//! Date ranges are inclusive calendar dates; internally orders and
//! payments are filtered on `[start 00:00, end+1 00:00)` UTC.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

use crate::error::{StoreError, StoreResult};
use opsdesk_core::reports::{
    self, CustomerBalance, ProductProfit, ProductSales, RevenueSummary, StatusCount, TrendPoint,
};
use opsdesk_core::{capabilities, Actor};
use opsdesk_db::Database;

/// Read-only reporting over orders, payments, products and expenses.
#[derive(Debug, Clone)]
pub struct ReportingService {
    db: Database,
}

impl ReportingService {
    pub fn new(db: Database) -> Self {
        ReportingService { db }
    }

    fn require_reports(actor: &Actor) -> StoreResult<()> {
        if !capabilities(actor.role).view_reports {
            return Err(StoreError::forbidden(actor.role, "view reports"));
        }
        Ok(())
    }

    /// Headline revenue figures for an inclusive date range.
    pub async fn revenue_summary(
        &self,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<RevenueSummary> {
        Self::require_reports(actor)?;
        let (from, to) = range_bounds(start, end);

        let orders = self.db.orders().list_between(from, to).await?;
        let payments = self.db.payments().list_between(from, to).await?;
        let expenses = self.db.expenses().list_between(start, end).await?;

        Ok(reports::revenue_summary(&orders, &payments, &expenses))
    }

    /// Billed revenue per day over the trailing `days` days.
    pub async fn daily_trend(&self, actor: &Actor, days: u32) -> StoreResult<Vec<TrendPoint>> {
        Self::require_reports(actor)?;

        let today = Utc::now().date_naive();
        let start = today
            .checked_sub_days(Days::new(days.saturating_sub(1) as u64))
            .unwrap_or(today);
        let (from, to) = range_bounds(start, today);

        let orders = self.db.orders().list_between(from, to).await?;
        Ok(reports::daily_revenue_trend(&orders, today, days))
    }

    /// Billed revenue per calendar month over the trailing `months` months.
    pub async fn monthly_trend(
        &self,
        actor: &Actor,
        months: u32,
    ) -> StoreResult<Vec<TrendPoint>> {
        Self::require_reports(actor)?;

        let today = Utc::now().date_naive();
        // Generous lower bound; the reduction buckets exactly.
        let start = today
            .checked_sub_days(Days::new(31 * months as u64))
            .unwrap_or(today);
        let (from, to) = range_bounds(start, today);

        let orders = self.db.orders().list_between(from, to).await?;
        Ok(reports::monthly_revenue_trend(&orders, today, months))
    }

    /// Products ranked by revenue over an inclusive date range.
    pub async fn top_products(
        &self,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> StoreResult<Vec<ProductSales>> {
        Self::require_reports(actor)?;
        let (from, to) = range_bounds(start, end);

        let items = self.db.orders().items_between(from, to).await?;
        Ok(reports::top_products(&items, limit))
    }

    /// Per-product profit over an inclusive date range, using current
    /// catalog costs.
    pub async fn product_profit(
        &self,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<ProductProfit>> {
        Self::require_reports(actor)?;
        let (from, to) = range_bounds(start, end);

        let items = self.db.orders().items_between(from, to).await?;
        let products = self.db.products().list(true).await?;
        Ok(reports::product_profit(&items, &products))
    }

    /// Outstanding balances per customer over an inclusive date range,
    /// largest debt first. Fully paid customers are omitted.
    pub async fn customer_balances(
        &self,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<CustomerBalance>> {
        Self::require_reports(actor)?;
        let (from, to) = range_bounds(start, end);

        let orders = self.db.orders().list_between(from, to).await?;
        let payments = self.db.payments().list_between(from, to).await?;
        Ok(reports::customer_balances(&orders, &payments))
    }

    /// Pipeline histogram over an inclusive date range.
    pub async fn status_breakdown(
        &self,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<StatusCount>> {
        Self::require_reports(actor)?;
        let (from, to) = range_bounds(start, end);

        let orders = self.db.orders().list_between(from, to).await?;
        Ok(reports::status_breakdown(&orders))
    }
}

/// `[start 00:00, end+1 00:00)` in UTC.
fn range_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = start.and_time(NaiveTime::MIN).and_utc();
    let to = end
        .checked_add_days(Days::new(1))
        .unwrap_or(end)
        .and_time(NaiveTime::MIN)
        .and_utc();
    (from, to)
}
