//! Admin dashboard figures and the monthly collection overview.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use common::Money;
use domain::{Order, OrderStatus};
use serde::Serialize;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Number of months in the collection overview, current month included.
pub const OVERVIEW_MONTHS: usize = 6;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Count of orders currently accepted and awaiting pickup.
    pub active_collectors: u64,
    pub total_earnings: Money,
    pub total_weight_kg: f64,
    pub today_weight_kg: f64,
    pub today_orders: u64,
    pub weight_change_pct: f64,
    pub earnings_change_pct: f64,
    pub active_orders_change_pct: f64,
}

/// Recycled weight for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCollection {
    pub year: i32,
    pub month: u32,
    pub label: &'static str,
    pub total_weight_kg: f64,
}

/// Relative change from `previous` to `current` in percent, rounded to two
/// decimals. A zero baseline counts as 100% growth, or 0 if both are zero.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round2((current - previous) / previous * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calendar month as a single ordinal so that month arithmetic never needs
/// a date constructor.
fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn local_date<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Computes dashboard figures as of `now`. Day and month boundaries follow
/// the time zone of `now`; the week-over-week comparison uses the trailing
/// seven days against the seven before them.
pub fn dashboard_stats<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> DashboardStats {
    let tz = now.timezone();
    let today = now.date_naive();
    let this_month = month_index(today);
    let now_utc = now.with_timezone(&Utc);
    let week_ago = now_utc - Duration::days(7);
    let two_weeks_ago = now_utc - Duration::days(14);

    let mut stats = DashboardStats {
        active_collectors: 0,
        total_earnings: Money::zero(),
        total_weight_kg: 0.0,
        today_weight_kg: 0.0,
        today_orders: 0,
        weight_change_pct: 0.0,
        earnings_change_pct: 0.0,
        active_orders_change_pct: 0.0,
    };
    let (mut month_weight, mut last_month_weight) = (0.0, 0.0);
    let (mut month_earnings, mut last_month_earnings) = (Money::zero(), Money::zero());
    let (mut active_this_week, mut active_last_week) = (0u64, 0u64);

    for order in orders {
        match order.status() {
            OrderStatus::Accepted => {
                stats.active_collectors += 1;
                if let Some(accepted_at) = order.accepted_at() {
                    if accepted_at >= week_ago && accepted_at < now_utc {
                        active_this_week += 1;
                    } else if accepted_at >= two_weeks_ago && accepted_at < week_ago {
                        active_last_week += 1;
                    }
                }
            }
            OrderStatus::Recycled => {
                let weight = order.total_weight_kg();
                let earnings = order.total_amount().unwrap_or_default();
                stats.total_weight_kg += weight;
                stats.total_earnings += earnings;

                let Some(recycled_at) = order.recycled_at() else {
                    continue;
                };
                let day = local_date(recycled_at, &tz);
                if day == today {
                    stats.today_weight_kg += weight;
                    stats.today_orders += 1;
                }
                let month = month_index(day);
                if month == this_month {
                    month_weight += weight;
                    month_earnings += earnings;
                } else if month == this_month - 1 {
                    last_month_weight += weight;
                    last_month_earnings += earnings;
                }
            }
            OrderStatus::Pending | OrderStatus::Cancelled => {}
        }
    }

    stats.weight_change_pct = percentage_change(month_weight, last_month_weight);
    stats.earnings_change_pct = percentage_change(
        month_earnings.as_major(),
        last_month_earnings.as_major(),
    );
    stats.active_orders_change_pct =
        percentage_change(active_this_week as f64, active_last_week as f64);
    stats
}

/// Recycled weight for the current month and the five before it, oldest
/// first. Months without recycled orders are reported as zero.
pub fn collection_overview<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> Vec<MonthlyCollection> {
    let tz = now.timezone();
    let last = month_index(now.date_naive());
    let first = last - (OVERVIEW_MONTHS as i64 - 1);

    let mut overview: Vec<MonthlyCollection> = (first..=last)
        .map(|index| {
            let month0 = index.rem_euclid(12) as usize;
            MonthlyCollection {
                year: index.div_euclid(12) as i32,
                month: month0 as u32 + 1,
                label: MONTH_LABELS[month0],
                total_weight_kg: 0.0,
            }
        })
        .collect();

    for order in orders {
        if order.status() != OrderStatus::Recycled {
            continue;
        }
        let Some(recycled_at) = order.recycled_at() else {
            continue;
        };
        let index = month_index(local_date(recycled_at, &tz));
        if (first..=last).contains(&index) {
            overview[(index - first) as usize].total_weight_kg += order.total_weight_kg();
        }
    }
    overview
}
