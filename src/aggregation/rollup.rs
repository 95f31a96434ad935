//! Per-category totals for a set of transactions.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    category::CategoryName,
    transaction::{Transaction, TransactionKind},
};

/// The total amount of a category within a set of transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category label.
    pub category: CategoryName,
    /// Whether the category is income or expenses.
    pub kind: TransactionKind,
    /// The sum of the amounts of the transactions in the category.
    pub total: f64,
}

/// Sum the amounts of `transactions` per category, largest total first.
///
/// Categories are grouped by label and kind, so an income and an expense category with the same
/// label stay separate. Categories with equal totals keep the order they were first seen in.
pub fn rollup_categories<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut positions: HashMap<(&'a str, TransactionKind), usize> = HashMap::new();

    for transaction in transactions {
        let key = (transaction.category.as_ref(), transaction.kind);

        match positions.get(&key) {
            Some(&position) => totals[position].total += transaction.amount,
            None => {
                positions.insert(key, totals.len());
                totals.push(CategoryTotal {
                    category: transaction.category.clone(),
                    kind: transaction.kind,
                    total: transaction.amount,
                });
            }
        }
    }

    // `sort_by` is stable, ties keep first-seen order.
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));

    totals
}

/// Split sorted category totals into income and expense lists, keeping their order.
pub fn split_by_kind(totals: Vec<CategoryTotal>) -> (Vec<CategoryTotal>, Vec<CategoryTotal>) {
    totals
        .into_iter()
        .partition(|total| total.kind == TransactionKind::Income)
}

/// Totals and category breakdown for a set of transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// The total income.
    pub income: f64,
    /// The total expenses.
    pub expense: f64,
    /// `income - expense`.
    pub net: f64,
    /// Income categories, largest first.
    pub income_categories: Vec<CategoryTotal>,
    /// Expense categories, largest first.
    pub expense_categories: Vec<CategoryTotal>,
}

/// Summarize `transactions` into totals and per-category breakdowns.
pub fn summarize<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> PeriodSummary {
    let (income_categories, expense_categories) = split_by_kind(rollup_categories(transactions));

    let income: f64 = income_categories.iter().map(|total| total.total).sum();
    let expense: f64 = expense_categories.iter().map(|total| total.total).sum();

    PeriodSummary {
        income,
        expense,
        net: income - expense,
        income_categories,
        expense_categories,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        aggregation::rollup::{rollup_categories, summarize},
        transaction::{Transaction, TransactionKind, test_transaction},
    };

    fn expense(amount: f64, category: &str) -> Transaction {
        test_transaction(TransactionKind::Expense, amount, date!(2024 - 03 - 15), category)
    }

    fn income(amount: f64, category: &str) -> Transaction {
        test_transaction(TransactionKind::Income, amount, date!(2024 - 03 - 15), category)
    }

    #[test]
    fn sorts_descending_by_total() {
        let transactions = vec![
            expense(10.0, "Coffee"),
            expense(200.0, "Rent"),
            expense(20.0, "Coffee"),
            expense(50.0, "Food"),
        ];

        let totals = rollup_categories(&transactions);

        let got: Vec<(&str, f64)> = totals
            .iter()
            .map(|total| (total.category.as_ref(), total.total))
            .collect();
        assert_eq!(got, vec![("Rent", 200.0), ("Food", 50.0), ("Coffee", 30.0)]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let transactions = vec![
            expense(25.0, "Transport"),
            expense(5.0, "Books"),
            expense(25.0, "Books"),
            expense(30.0, "Gym"),
            expense(5.0, "Transport"),
        ];

        let totals = rollup_categories(&transactions);

        let got: Vec<&str> = totals.iter().map(|total| total.category.as_ref()).collect();
        assert_eq!(got, vec!["Transport", "Books", "Gym"]);
    }

    #[test]
    fn same_label_is_split_by_kind() {
        let transactions = vec![
            expense(10.0, "Other"),
            income(15.0, "Other"),
            expense(1.0, "Other"),
        ];

        let totals = rollup_categories(&transactions);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].kind, TransactionKind::Income);
        assert_eq!(totals[0].total, 15.0);
        assert_eq!(totals[1].kind, TransactionKind::Expense);
        assert_eq!(totals[1].total, 11.0);
    }

    #[test]
    fn labels_are_case_sensitive() {
        let transactions = vec![expense(1.0, "Food"), expense(2.0, "food")];

        assert_eq!(rollup_categories(&transactions).len(), 2);
    }

    #[test]
    fn category_totals_match_kind_totals() {
        let transactions = vec![
            expense(12.5, "Food"),
            income(1000.0, "Wages"),
            expense(7.25, "Coffee"),
            income(50.0, "Gift"),
            expense(0.0, "Free"),
            expense(30.0, "Food"),
        ];

        let summary = summarize(&transactions);

        let expense_sum: f64 = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense)
            .map(|t| t.amount)
            .sum();
        let income_sum: f64 = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Income)
            .map(|t| t.amount)
            .sum();
        assert_eq!(summary.expense, expense_sum);
        assert_eq!(summary.income, income_sum);
        assert_eq!(summary.net, income_sum - expense_sum);
        assert_eq!(summary.income_categories.len(), 2);
        assert_eq!(summary.expense_categories.len(), 3);
    }

    #[test]
    fn empty_input_has_no_groups() {
        let transactions: Vec<Transaction> = Vec::new();

        let summary = summarize(&transactions);

        assert!(summary.income_categories.is_empty());
        assert!(summary.expense_categories.is_empty());
        assert_eq!(summary.net, 0.0);
    }
}
