//! Chart generation for the dashboard.
//!
//! The chart is returned as ECharts options, the client only needs to pass them to
//! `chart.setOption`.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Candlestick, bar},
};

use crate::{
    aggregation::{PeriodPoint, RangeMode},
    locale::Language,
    transaction::TransactionKind,
};

/// A candlestick of the balance envelope per period with income and expense bars beside it.
///
/// Each candle is `[opening, closing, low, high]`.
pub(super) fn cashflow_chart(points: &[PeriodPoint], mode: RangeMode, language: Language) -> Chart {
    let labels: Vec<String> = points.iter().map(|point| point.label.clone()).collect();
    let candles: Vec<Vec<f64>> = points
        .iter()
        .map(|point| {
            vec![
                point.opening_balance,
                point.closing_balance,
                point.low,
                point.high,
            ]
        })
        .collect();
    let income: Vec<f64> = points.iter().map(|point| point.income).collect();
    let expense: Vec<f64> = points.iter().map(|point| point.expense).collect();

    Chart::new()
        .title(
            Title::new()
                .text(language.balance_label())
                .subtext(language.range_title(mode)),
        )
        .tooltip(currency_tooltip(language))
        .legend(Legend::new().top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(70)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(language))),
        )
        .series(
            Candlestick::new()
                .name(language.balance_label())
                .data(candles),
        )
        .series(
            bar::Bar::new()
                .name(language.kind_label(TransactionKind::Income))
                .data(income),
        )
        .series(
            bar::Bar::new()
                .name(language.kind_label(TransactionKind::Expense))
                .data(expense),
        )
}

fn currency_formatter(language: Language) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('{}', {{
                  minimumFractionDigits: 2,
                  maximumFractionDigits: 2
                }});
                return (number) ? currencyFormatter.format(number) : \"-\";",
            language.tag()
        ),
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip(language: Language) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(language))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
