//! Builds the six week calendar grid for a month.

use std::{collections::HashMap, ops::RangeInclusive};

use serde::Serialize;
use time::{Date, Duration, Month};

use crate::{
    Error,
    aggregation::month_start,
    transaction::{Transaction, TransactionKind},
};

/// The number of cells in a calendar grid, six rows of seven days.
pub const CALENDAR_GRID_CELLS: usize = 42;

/// A month shown on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    first_day: Date,
}

impl CalendarMonth {
    /// Create a calendar month from a year and a zero-based month index (January = 0).
    ///
    /// # Errors
    /// Returns [Error::InvalidMonthIndex] if `month_index` is greater than 11, or
    /// [Error::InvalidYear] if `year` is not between 1 and 9999 or the month's grid would run past
    /// the last supported date (December 9999).
    pub fn new(year: i32, month_index: u8) -> Result<Self, Error> {
        if !(1..=9999).contains(&year) {
            return Err(Error::InvalidYear(year));
        }

        let month = month_index
            .checked_add(1)
            .and_then(|number| Month::try_from(number).ok())
            .ok_or(Error::InvalidMonthIndex(month_index))?;

        let first_day = Date::from_calendar_date(year, month, 1)
            .map_err(|_| Error::InvalidMonthIndex(month_index))?;

        let month = Self { first_day };
        month
            .checked_grid_date_range()
            .ok_or(Error::InvalidYear(year))?;

        Ok(month)
    }

    /// The month that `date` falls in.
    pub fn containing(date: Date) -> Self {
        Self {
            first_day: month_start(date),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The month of the year.
    pub fn month(&self) -> Month {
        self.first_day.month()
    }

    /// The zero-based month index, January = 0.
    pub fn month_index(&self) -> u8 {
        u8::from(self.first_day.month()) - 1
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        self.first_day
    }

    /// Whether `date` falls in this month.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// The number of days shown from the previous month before the first of the month.
    ///
    /// Weeks start on Monday, so a month starting on a Sunday is preceded by six days.
    pub fn days_from_previous_month(&self) -> u8 {
        self.first_day.weekday().number_days_from_monday()
    }

    /// The first and last dates shown on the grid for this month.
    ///
    /// Months accepted by [CalendarMonth::new] always fit, for others the range is clamped to the
    /// supported dates.
    pub fn grid_date_range(&self) -> RangeInclusive<Date> {
        self.checked_grid_date_range().unwrap_or_else(|| {
            let start = self
                .first_day
                .saturating_sub(Duration::days(i64::from(self.days_from_previous_month())));
            start..=start.saturating_add(Duration::days(CALENDAR_GRID_CELLS as i64 - 1))
        })
    }

    fn checked_grid_date_range(&self) -> Option<RangeInclusive<Date>> {
        let start = self
            .first_day
            .checked_sub(Duration::days(i64::from(self.days_from_previous_month())))?;
        let end = start.checked_add(Duration::days(CALENDAR_GRID_CELLS as i64 - 1))?;

        Some(start..=end)
    }
}

/// One cell of the calendar grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket<'a> {
    /// The date of the cell.
    pub date: Date,
    /// Whether the date is in the month being shown.
    pub in_focus_month: bool,
    /// The transactions that happened on this date. Always empty outside the focus month.
    pub transactions: Vec<&'a Transaction>,
    /// The total income on this date.
    pub income: f64,
    /// The total expenses on this date.
    pub expense: f64,
}

/// Lay out `month` as a Monday-first grid of exactly [CALENDAR_GRID_CELLS] days.
///
/// The grid starts with the tail of the previous month, then every day of `month`, then enough
/// days of the next month to fill six weeks. Only days in `month` carry transactions,
/// `transactions` may contain dates outside of the month and in any order.
pub fn build_calendar_grid(month: CalendarMonth, transactions: &[Transaction]) -> Vec<DayBucket<'_>> {
    let mut transactions_by_date: HashMap<Date, Vec<&Transaction>> = HashMap::new();
    for transaction in transactions
        .iter()
        .filter(|transaction| month.contains(transaction.occurred_on))
    {
        transactions_by_date
            .entry(transaction.occurred_on)
            .or_default()
            .push(transaction);
    }

    let grid_start = *month.grid_date_range().start();

    (0..CALENDAR_GRID_CELLS as i64)
        .map(|offset| {
            let date = grid_start.saturating_add(Duration::days(offset));
            let in_focus_month = month.contains(date);
            let day_transactions = transactions_by_date.remove(&date).unwrap_or_default();

            let (income, expense) =
                day_transactions
                    .iter()
                    .fold((0.0, 0.0), |(income, expense), transaction| {
                        match transaction.kind {
                            TransactionKind::Income => (income + transaction.amount, expense),
                            TransactionKind::Expense => (income, expense + transaction.amount),
                        }
                    });

            DayBucket {
                date,
                in_focus_month,
                transactions: day_transactions,
                income,
                expense,
            }
        })
        .collect()
}
