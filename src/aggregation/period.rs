//! Buckets transactions into a fixed number of recent periods with a running balance.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    aggregation::{month_end, month_start},
    locale::Language,
    transaction::{Transaction, TransactionKind},
};

/// How far back the dashboard looks and how it slices that time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeMode {
    /// One bucket per day for the last seven days, including today.
    #[default]
    #[serde(rename = "last-7-days")]
    Last7Days,
    /// Five rolling seven day weeks ending today.
    #[serde(rename = "last-5-weeks")]
    Last5Weeks,
    /// Twelve calendar months ending with the current month.
    #[serde(rename = "last-12-months")]
    Last12Months,
}

impl RangeMode {
    /// The range modes in the order they are offered to users.
    pub const ALL: [RangeMode; 3] = [Self::Last7Days, Self::Last5Weeks, Self::Last12Months];

    /// The value used for this mode in query strings.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Last7Days => "last-7-days",
            Self::Last5Weeks => "last-5-weeks",
            Self::Last12Months => "last-12-months",
        }
    }

    /// The number of buckets produced for this mode.
    pub fn bucket_count(self) -> usize {
        match self {
            Self::Last7Days => 7,
            Self::Last5Weeks => 5,
            Self::Last12Months => 12,
        }
    }

    /// The first day of the oldest bucket when the window ends on `today`.
    ///
    /// Transactions before this date only contribute to the opening balance.
    pub fn window_start(self, today: Date) -> Date {
        match self {
            Self::Last7Days => today.saturating_sub(Duration::days(6)),
            Self::Last5Weeks => today.saturating_sub(Duration::days(5 * 7 - 1)),
            Self::Last12Months => (0..11).fold(month_start(today), |start, _| {
                month_start(start.saturating_sub(Duration::days(1)))
            }),
        }
    }
}

impl Display for RangeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query_value())
    }
}

/// One bucket in the series produced by [aggregate_periods].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodPoint {
    /// The localized label, e.g. "Mon", "Week 2" or "Jan".
    pub label: String,
    /// The representative date of the bucket, the day itself or the first day of the week or month.
    pub date: Date,
    /// The first day of the bucket.
    pub start: Date,
    /// The last day of the bucket.
    pub end: Date,
    /// Total income in the bucket.
    pub income: f64,
    /// Total expenses in the bucket.
    pub expense: f64,
    /// `income - expense`.
    pub net: f64,
    /// The balance before this bucket.
    pub opening_balance: f64,
    /// `opening_balance + net`.
    pub closing_balance: f64,
    /// The upper bound of the balance within the bucket.
    pub high: f64,
    /// The lower bound of the balance within the bucket.
    pub low: f64,
}

impl PeriodPoint {
    fn empty(label: String, start: Date, end: Date) -> Self {
        Self {
            label,
            date: start,
            start,
            end,
            income: 0.0,
            expense: 0.0,
            net: 0.0,
            opening_balance: 0.0,
            closing_balance: 0.0,
            high: 0.0,
            low: 0.0,
        }
    }
}

/// Bucket `transactions` into the periods of `mode` ending on `today`, oldest first.
///
/// Transactions before the window are summed into the opening balance of the first bucket.
/// Transactions after `today` are ignored. The closing balance of the last bucket equals the
/// signed sum of every transaction up to and including `today`.
pub fn aggregate_periods(
    transactions: &[Transaction],
    today: Date,
    mode: RangeMode,
    language: Language,
) -> Vec<PeriodPoint> {
    let mut points = allocate_buckets(today, mode, language);
    let window_start = mode.window_start(today);
    let mut opening_balance = 0.0;

    for transaction in transactions {
        let occurred_on = transaction.occurred_on;

        if occurred_on > today {
            continue;
        }

        if occurred_on < window_start {
            opening_balance += transaction.signed_amount();
            continue;
        }

        let Some(point) = bucket_index(mode, today, occurred_on).and_then(|i| points.get_mut(i))
        else {
            tracing::debug!("dropping transaction on {occurred_on} outside of the {mode} buckets");
            continue;
        };

        match transaction.kind {
            TransactionKind::Income => point.income += transaction.amount,
            TransactionKind::Expense => point.expense += transaction.amount,
        }
    }

    roll_forward(&mut points, opening_balance);

    points
}

fn allocate_buckets(today: Date, mode: RangeMode, language: Language) -> Vec<PeriodPoint> {
    match mode {
        RangeMode::Last7Days => (0..7)
            .rev()
            .map(|days_ago| {
                let day = today.saturating_sub(Duration::days(days_ago));
                PeriodPoint::empty(language.weekday_abbrev(day.weekday()).to_owned(), day, day)
            })
            .collect(),
        RangeMode::Last5Weeks => (0..5)
            .rev()
            .enumerate()
            .map(|(position, weeks_ago)| {
                let end = today.saturating_sub(Duration::weeks(weeks_ago));
                let start = end.saturating_sub(Duration::days(6));
                PeriodPoint::empty(language.week_label(position + 1), start, end)
            })
            .collect(),
        RangeMode::Last12Months => {
            let mut start = mode.window_start(today);
            let mut points = Vec::with_capacity(mode.bucket_count());

            for _ in 0..mode.bucket_count() {
                let end = month_end(start);
                points.push(PeriodPoint::empty(
                    language.month_abbrev(start.month()).to_owned(),
                    start,
                    end,
                ));
                start = end.saturating_add(Duration::days(1));
            }

            points
        }
    }
}

/// The position of the bucket that `date` falls in, counting from the oldest bucket.
///
/// Returns `None` for dates outside of the buckets.
fn bucket_index(mode: RangeMode, today: Date, date: Date) -> Option<usize> {
    let count = mode.bucket_count() as i64;

    let periods_ago = match mode {
        RangeMode::Last7Days => (today - date).whole_days(),
        RangeMode::Last5Weeks => (today - date).whole_days().div_euclid(7),
        RangeMode::Last12Months => month_number(today) - month_number(date),
    };

    if (0..count).contains(&periods_ago) {
        usize::try_from(count - 1 - periods_ago).ok()
    } else {
        None
    }
}

fn roll_forward(points: &mut [PeriodPoint], opening_balance: f64) {
    let mut balance = opening_balance;

    for point in points {
        point.net = point.income - point.expense;
        point.opening_balance = balance;
        balance += point.net;
        point.closing_balance = balance;
        point.high = point
            .opening_balance
            .max(point.closing_balance)
            .max(point.opening_balance + point.income);
        point.low = point
            .opening_balance
            .min(point.closing_balance)
            .min(point.opening_balance - point.expense);
    }
}

/// Months since year zero, so consecutive months differ by one.
fn month_number(date: Date) -> i64 {
    i64::from(date.year()) * 12 + i64::from(u8::from(date.month()))
}
