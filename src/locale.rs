//! Human-readable labels for the two supported display languages.
//!
//! The aggregation engine only asks for labels by [Language]; it never
//! formats numbers or currencies itself.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Month, Weekday};

use crate::{Error, aggregation::RangeMode, transaction::TransactionKind};

/// The language used for labels in charts, reports and exports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English labels, e.g. "Mon", "Jan", "Week 1".
    #[default]
    #[serde(rename = "en")]
    English,
    /// Spanish labels, e.g. "lun", "ene", "Semana 1".
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    /// The two letter language tag, e.g. "en".
    pub fn tag(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
        }
    }

    /// The abbreviated name of `weekday`.
    pub fn weekday_abbrev(self, weekday: Weekday) -> &'static str {
        match self {
            Self::English => match weekday {
                Weekday::Monday => "Mon",
                Weekday::Tuesday => "Tue",
                Weekday::Wednesday => "Wed",
                Weekday::Thursday => "Thu",
                Weekday::Friday => "Fri",
                Weekday::Saturday => "Sat",
                Weekday::Sunday => "Sun",
            },
            Self::Spanish => match weekday {
                Weekday::Monday => "lun",
                Weekday::Tuesday => "mar",
                Weekday::Wednesday => "mié",
                Weekday::Thursday => "jue",
                Weekday::Friday => "vie",
                Weekday::Saturday => "sáb",
                Weekday::Sunday => "dom",
            },
        }
    }

    /// The abbreviated name of `month`.
    pub fn month_abbrev(self, month: Month) -> &'static str {
        match self {
            Self::English => match month {
                Month::January => "Jan",
                Month::February => "Feb",
                Month::March => "Mar",
                Month::April => "Apr",
                Month::May => "May",
                Month::June => "Jun",
                Month::July => "Jul",
                Month::August => "Aug",
                Month::September => "Sep",
                Month::October => "Oct",
                Month::November => "Nov",
                Month::December => "Dec",
            },
            Self::Spanish => match month {
                Month::January => "ene",
                Month::February => "feb",
                Month::March => "mar",
                Month::April => "abr",
                Month::May => "may",
                Month::June => "jun",
                Month::July => "jul",
                Month::August => "ago",
                Month::September => "sep",
                Month::October => "oct",
                Month::November => "nov",
                Month::December => "dic",
            },
        }
    }

    /// The label for the `number`-th week of a weekly series, starting at one.
    pub fn week_label(self, number: usize) -> String {
        match self {
            Self::English => format!("Week {number}"),
            Self::Spanish => format!("Semana {number}"),
        }
    }

    /// The display name for a transaction kind.
    pub fn kind_label(self, kind: TransactionKind) -> &'static str {
        match (self, kind) {
            (Self::English, TransactionKind::Income) => "Income",
            (Self::English, TransactionKind::Expense) => "Expense",
            (Self::Spanish, TransactionKind::Income) => "Ingreso",
            (Self::Spanish, TransactionKind::Expense) => "Gasto",
        }
    }

    /// Column headers for exported transaction reports, in column order:
    /// date, kind, category, amount and description.
    pub fn export_headers(self) -> [&'static str; 5] {
        match self {
            Self::English => ["Date", "Type", "Category", "Amount", "Description"],
            Self::Spanish => ["Fecha", "Tipo", "Categoría", "Monto", "Descripción"],
        }
    }

    /// The series name for the running balance.
    pub fn balance_label(self) -> &'static str {
        match self {
            Self::English => "Balance",
            Self::Spanish => "Saldo",
        }
    }

    /// The heading for a dashboard range, e.g. "Last 7 days".
    pub fn range_title(self, mode: RangeMode) -> &'static str {
        match (self, mode) {
            (Self::English, RangeMode::Last7Days) => "Last 7 days",
            (Self::English, RangeMode::Last5Weeks) => "Last 5 weeks",
            (Self::English, RangeMode::Last12Months) => "Last 12 months",
            (Self::Spanish, RangeMode::Last7Days) => "Últimos 7 días",
            (Self::Spanish, RangeMode::Last5Weeks) => "Últimas 5 semanas",
            (Self::Spanish, RangeMode::Last12Months) => "Últimos 12 meses",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::English),
            "es" => Ok(Self::Spanish),
            _ => Err(Error::InvalidLanguage(s.to_owned())),
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, Weekday};

    use crate::{Error, locale::Language, transaction::TransactionKind};

    #[test]
    fn parses_language_tags() {
        assert_eq!("en".parse(), Ok(Language::English));
        assert_eq!("ES".parse(), Ok(Language::Spanish));
        assert_eq!(
            "fr".parse::<Language>(),
            Err(Error::InvalidLanguage("fr".to_owned()))
        );
    }

    #[test]
    fn labels_follow_language() {
        assert_eq!(Language::English.weekday_abbrev(Weekday::Wednesday), "Wed");
        assert_eq!(Language::Spanish.weekday_abbrev(Weekday::Wednesday), "mié");
        assert_eq!(Language::English.month_abbrev(Month::August), "Aug");
        assert_eq!(Language::Spanish.month_abbrev(Month::August), "ago");
        assert_eq!(Language::Spanish.week_label(3), "Semana 3");
        assert_eq!(
            Language::Spanish.kind_label(TransactionKind::Expense),
            "Gasto"
        );
    }

    #[test]
    fn serializes_as_language_tag() {
        let json = serde_json::to_string(&Language::Spanish).unwrap();

        assert_eq!(json, "\"es\"");
    }
}
