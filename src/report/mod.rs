//! Summary and aggregation over transaction lists
//!
//! Everything here is pure arithmetic over in-memory snapshots:
//! - Balance folding and income/expense summaries
//! - Category breakdown (pie chart data)
//! - Daily income/expense series (line chart data)
//! - Date-range presets resolved against an explicit `Clock`

mod aggregate;
mod filter;

pub use aggregate::{
    balance, category_breakdown, daily_series, month_totals, summarize, unknown_categories,
    DailyTotals, MonthTotals,
};
pub use filter::{CalendarZone, Clock, DateFilter, DateRange, FixedClock, SystemClock};
