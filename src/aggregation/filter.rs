//! Report periods: a single day, month or year selected by a period key.

use std::{fmt::Display, ops::RangeInclusive};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

use crate::{
    Error,
    aggregation::{month_end, month_start},
    transaction::Transaction,
};

/// How long a report period is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportGranularity {
    /// A single day, keyed `YYYY-MM-DD`.
    Daily,
    /// A calendar month, keyed `YYYY-MM`.
    #[default]
    Monthly,
    /// A calendar year, keyed `YYYY`.
    Yearly,
}

/// A day, month or year that a report covers.
///
/// Each variant holds the first day of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportPeriod {
    /// A single day.
    Day(Date),
    /// A calendar month.
    Month(Date),
    /// A calendar year.
    Year(Date),
}

impl ReportPeriod {
    /// Parse a period key for `granularity`, e.g. "2024-03-15", "2024-03" or "2024".
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriodKey] if `key` is not a valid key for `granularity`.
    pub fn parse(granularity: ReportGranularity, key: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidPeriodKey(key.to_owned());
        let parts: Vec<&str> = key.split('-').collect();

        match (granularity, parts.as_slice()) {
            (ReportGranularity::Daily, [year, month, day]) => {
                let date = Date::from_calendar_date(
                    parse_year(year).ok_or_else(invalid)?,
                    parse_month(month).ok_or_else(invalid)?,
                    parse_two_digits(day).ok_or_else(invalid)?,
                )
                .map_err(|_| invalid())?;

                Ok(Self::Day(date))
            }
            (ReportGranularity::Monthly, [year, month]) => {
                let first_day = Date::from_calendar_date(
                    parse_year(year).ok_or_else(invalid)?,
                    parse_month(month).ok_or_else(invalid)?,
                    1,
                )
                .map_err(|_| invalid())?;

                Ok(Self::Month(first_day))
            }
            (ReportGranularity::Yearly, [year]) => {
                let first_day =
                    Date::from_calendar_date(parse_year(year).ok_or_else(invalid)?, Month::January, 1)
                        .map_err(|_| invalid())?;

                Ok(Self::Year(first_day))
            }
            _ => Err(invalid()),
        }
    }

    /// The period of `granularity` that contains `date`.
    pub fn containing(granularity: ReportGranularity, date: Date) -> Self {
        match granularity {
            ReportGranularity::Daily => Self::Day(date),
            ReportGranularity::Monthly => Self::Month(month_start(date)),
            ReportGranularity::Yearly => {
                Self::Year(date.saturating_sub(Duration::days(i64::from(date.ordinal()) - 1)))
            }
        }
    }

    /// The granularity of the period.
    pub fn granularity(&self) -> ReportGranularity {
        match self {
            Self::Day(_) => ReportGranularity::Daily,
            Self::Month(_) => ReportGranularity::Monthly,
            Self::Year(_) => ReportGranularity::Yearly,
        }
    }

    /// The canonical period key, the inverse of [ReportPeriod::parse].
    pub fn key(&self) -> String {
        match self {
            Self::Day(date) => format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                u8::from(date.month()),
                date.day()
            ),
            Self::Month(date) => format!("{:04}-{:02}", date.year(), u8::from(date.month())),
            Self::Year(date) => format!("{:04}", date.year()),
        }
    }

    /// Whether `date` falls inside the period.
    pub fn contains(&self, date: Date) -> bool {
        match self {
            Self::Day(day) => date == *day,
            Self::Month(first_day) => {
                date.year() == first_day.year() && date.month() == first_day.month()
            }
            Self::Year(first_day) => date.year() == first_day.year(),
        }
    }

    /// The first and last day of the period.
    pub fn date_range(&self) -> RangeInclusive<Date> {
        match *self {
            Self::Day(day) => day..=day,
            Self::Month(first_day) => first_day..=month_end(first_day),
            Self::Year(first_day) => {
                let days_in_year = i64::from(time::util::days_in_year(first_day.year()));
                first_day..=first_day.saturating_add(Duration::days(days_in_year - 1))
            }
        }
    }
}

impl Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// Select the transactions that fall inside `period`, keeping their order.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    period: &ReportPeriod,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|transaction| period.contains(transaction.occurred_on))
        .collect()
}

fn parse_year(text: &str) -> Option<i32> {
    if text.len() == 4 && text.bytes().all(|byte| byte.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

fn parse_two_digits(text: &str) -> Option<u8> {
    if text.len() == 2 && text.bytes().all(|byte| byte.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

fn parse_month(text: &str) -> Option<Month> {
    parse_two_digits(text).and_then(|number| Month::try_from(number).ok())
}
