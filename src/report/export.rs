//! CSV export of transactions.

use std::cmp::Ordering;

use crate::{Error, locale::Language, transaction::Transaction};

/// The UTF-8 byte order mark written at the start of exports so spreadsheet programs pick the
/// right encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write `transactions` as CSV with a byte order mark and a header row in `language`.
///
/// Rows are sorted by date, transactions on the same date keep their ID order. Amounts are
/// written with two decimal places and without a sign, the type column gives the kind.
///
/// # Errors
/// Returns [Error::ExportError] if a row cannot be written.
pub fn export_transactions_csv(
    transactions: &[&Transaction],
    language: Language,
) -> Result<Vec<u8>, Error> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| match a.occurred_on.cmp(&b.occurred_on) {
        Ordering::Equal => a.id.cmp(&b.id),
        ordering => ordering,
    });

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(UTF8_BOM.to_vec());

    writer
        .write_record(language.export_headers())
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for transaction in sorted {
        writer
            .write_record([
                transaction.occurred_on.to_string().as_str(),
                language.kind_label(transaction.kind),
                transaction.category.as_ref(),
                format!("{:.2}", transaction.amount).as_str(),
                transaction.description.as_deref().unwrap_or(""),
            ])
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        locale::Language,
        report::export::{UTF8_BOM, export_transactions_csv},
        transaction::{TransactionKind, test_transaction},
    };

    #[test]
    fn starts_with_bom_and_localized_header() {
        let bytes = export_transactions_csv(&[], Language::Spanish).unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "Fecha,Tipo,Categoría,Monto,Descripción\r\n");
    }

    #[test]
    fn writes_one_row_per_transaction_sorted_by_date() {
        let mut coffee =
            test_transaction(TransactionKind::Expense, 4.5, date!(2024 - 03 - 20), "Coffee");
        coffee.description = Some("flat white, large".to_owned());
        let wages = test_transaction(TransactionKind::Income, 1000.0, date!(2024 - 03 - 01), "Wages");

        let bytes = export_transactions_csv(&[&coffee, &wages], Language::English).unwrap();

        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Type,Category,Amount,Description",
                "2024-03-01,Income,Wages,1000.00,",
                "2024-03-20,Expense,Coffee,4.50,\"flat white, large\"",
            ]
        );
    }
}
