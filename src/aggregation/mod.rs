//! Pure functions that turn a list of transactions into the derived views: calendar grids,
//! dashboard series, category breakdowns and report periods.
//!
//! Nothing here reads the clock or the database, callers pass in `today` and the transactions.

use time::{Date, Duration};

mod calendar;
mod filter;
mod period;
mod rollup;

pub use calendar::{CALENDAR_GRID_CELLS, CalendarMonth, DayBucket, build_calendar_grid};
pub use filter::{ReportGranularity, ReportPeriod, filter_transactions};
pub use period::{PeriodPoint, RangeMode, aggregate_periods};
pub use rollup::{CategoryTotal, PeriodSummary, rollup_categories, split_by_kind, summarize};

/// The first day of the month that `date` falls in.
pub(crate) fn month_start(date: Date) -> Date {
    date.saturating_sub(Duration::days(i64::from(date.day()) - 1))
}

/// The last day of the month that `date` falls in.
pub(crate) fn month_end(date: Date) -> Date {
    month_start(month_start(date).saturating_add(Duration::days(31)))
        .saturating_sub(Duration::days(1))
}
