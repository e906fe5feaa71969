//! Chart, map and table ready projections of the aggregations
//!
//! Nothing in here changes a total. The adapters only order, label and
//! truncate what the [`Subset`](crate::Subset) aggregations return.

use std::fmt;

use log::debug;
use rust_decimal::RoundingStrategy;

use crate::engine::{Direction, Highlights, LocationPoint, Metric, SummaryMetrics};
use crate::{Amount, City, Subset, Table, Transaction, ViewState};

/// How many rows the table preview holds unless configured otherwise
pub const DEFAULT_PREVIEW_ROWS: usize = 1000;

/// Formats an hour of day as an axis label, e.g. `07:00`
pub fn hour_label(hour: u8) -> String {
    format!("{:02}:00", hour)
}

/// Formats an amount as dollars with thousands separators, e.g. `$1,234.50`
pub fn format_currency(amount: Amount, decimals: u32) -> String {
    let rounded = amount
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
        .to_string();
    let (sign, rounded) = match rounded.strip_prefix('-') {
        Some(rounded) => ("-", rounded),
        None => ("", rounded.as_str()),
    };
    let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded, ""));

    let mut formatted = format!("{}${}", sign, group_thousands(integer));
    if decimals > 0 {
        formatted.push('.');
        formatted.push_str(fraction);
        for _ in fraction.len()..decimals as usize {
            formatted.push('0');
        }
    }
    formatted
}

/// Formats a count with thousands separators, e.g. `12,345`
pub fn format_count(count: u64) -> String {
    group_thousands(&count.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// A single headline number
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ValueBox {
    pub title: String,
    pub value: String,
}

/// The three headline numbers of the selected city
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ValueBoxes {
    pub metrics: SummaryMetrics,
    pub total_sales: ValueBox,
    pub total_orders: ValueBox,
    pub avg_order_value: ValueBox,
}

impl ValueBoxes {
    pub fn new(city: City, metrics: SummaryMetrics) -> Self {
        Self {
            metrics,
            total_sales: ValueBox {
                title: format!("Total Sales in {}", city),
                value: format_currency(metrics.total_sales, 0),
            },
            total_orders: ValueBox {
                title: format!("Total Orders in {}", city),
                value: format_count(metrics.total_orders),
            },
            avg_order_value: ValueBox {
                title: format!("Average Order Value in {}", city),
                value: format_currency(metrics.avg_order_value, 2),
            },
        }
    }
}

/// One bar of a bar chart
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Bar {
    pub label: String,
    pub value: Amount,
}

/// A labelled category → value series
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Units ordered per month, in calendar order
    pub fn monthly_orders(subset: &Subset<'_>, city: City) -> Self {
        let bars = subset
            .monthly_series(Metric::Quantity)
            .into_iter()
            .map(|(month, total)| Bar {
                label: month.name().to_owned(),
                value: total,
            })
            .collect();

        Self {
            title: format!("Sales over Time -- {}", city),
            x_label: "Month",
            y_label: "Number of Orders",
            bars,
        }
    }

    /// A product ranking of the selected city
    pub fn ranking(subset: &Subset<'_>, state: ViewState, metric: Metric, direction: Direction) -> Self {
        let end = match direction {
            Direction::Largest => "Top",
            Direction::Smallest => "Bottom",
        };
        let (measure, y_label) = match metric {
            Metric::Quantity => ("Quantity Sold", "Quantity Ordered"),
            Metric::Value => ("Sales Value", "Total Sales Value ($)"),
        };
        let bars = subset
            .top_n(metric, usize::from(state.top_n), direction)
            .into_iter()
            .map(|(label, value)| Bar { label, value })
            .collect();

        Self {
            title: format!("{} {} Products by {}", end, state.top_n, measure),
            x_label: "Product",
            y_label,
            bars,
        }
    }
}

/// One row of the time-of-day heatmap
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct HeatmapRow {
    pub label: String,
    pub count: u64,
}

/// The fixed 24 row heatmap of orders per hour
pub fn heatmap(subset: &Subset<'_>) -> Vec<HeatmapRow> {
    subset
        .hourly_series()
        .into_iter()
        .map(|(hour, count)| HeatmapRow {
            label: hour_label(hour),
            count,
        })
        .collect()
}

/// The analysis summary shown next to the monthly chart
///
/// Every field is `None` when the selected city has no transactions.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct AnalysisSummary {
    pub best_month: Option<&'static str>,
    pub worst_month: Option<&'static str>,
    pub peak_hour: Option<String>,
}

impl From<Highlights> for AnalysisSummary {
    fn from(highlights: Highlights) -> Self {
        Self {
            best_month: Some(highlights.best_month.name()),
            worst_month: Some(highlights.worst_month.name()),
            peak_hour: Some(hour_label(highlights.peak_hour)),
        }
    }
}

/// Sales value of one state on the choropleth
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StateValue {
    pub state: String,
    pub value: Amount,
}

/// The choropleth of sales per state over the whole table
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StateMap {
    pub title: &'static str,
    pub states: Vec<StateValue>,
    pub unattributed: Amount,
}

impl StateMap {
    pub fn new(table: &Table) -> Self {
        let totals = table.all().state_totals();

        Self {
            title: "Sales Distribution by State",
            states: totals.by_state
                .into_iter()
                .map(|(state, value)| StateValue { state, value })
                .collect(),
            unattributed: totals.unattributed,
        }
    }
}

/// The leading rows of the selected city for tabular display
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TablePreview {
    /// Number of rows of the selected city before truncation
    pub total_rows: usize,
    pub rows: Vec<Transaction>,
}

impl TablePreview {
    pub fn new(subset: &Subset<'_>, limit: usize) -> Self {
        Self {
            total_rows: subset.len(),
            rows: subset.rows().take(limit).cloned().collect(),
        }
    }
}

/// Every view of the dashboard for one selection
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DashboardView {
    pub state: ViewState,
    pub value_boxes: ValueBoxes,
    pub monthly_orders: BarChart,
    pub analysis: AnalysisSummary,
    pub heatmap: Vec<HeatmapRow>,
    pub rankings: Vec<BarChart>,
    pub state_map: StateMap,
    pub location_points: Vec<LocationPoint>,
    pub table: TablePreview,
}

impl DashboardView {
    /// Computes all views from scratch
    pub fn compute(table: &Table, state: ViewState, preview_rows: usize) -> Self {
        debug!("computing dashboard for {} (top {})", state.city, state.top_n);
        let subset = table.subset(state.city);

        let rankings = [
            (Metric::Quantity, Direction::Largest),
            (Metric::Value, Direction::Largest),
            (Metric::Quantity, Direction::Smallest),
            (Metric::Value, Direction::Smallest),
        ]
        .into_iter()
        .map(|(metric, direction)| BarChart::ranking(&subset, state, metric, direction))
        .collect();

        Self {
            state,
            value_boxes: ValueBoxes::new(state.city, subset.summary_metrics()),
            monthly_orders: BarChart::monthly_orders(&subset, state.city),
            analysis: subset
                .best_worst_month()
                .map(AnalysisSummary::from)
                .unwrap_or_default(),
            heatmap: heatmap(&subset),
            rankings,
            state_map: StateMap::new(table),
            location_points: subset.location_points(),
            table: TablePreview::new(&subset, preview_rows),
        }
    }
}

impl fmt::Display for BarChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if self.bars.is_empty() {
            return writeln!(f, "  (no data)");
        }

        let width = self.bars
            .iter()
            .map(|bar| bar.label.len())
            .max()
            .unwrap_or_default();
        for bar in &self.bars {
            writeln!(f, "  {:<width$}  {}", bar.label, bar.value, width = width)?;
        }
        Ok(())
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blank = "-";

        for value_box in [
            &self.value_boxes.total_sales,
            &self.value_boxes.total_orders,
            &self.value_boxes.avg_order_value,
        ] {
            writeln!(f, "{}: {}", value_box.title, value_box.value)?;
        }
        writeln!(f)?;

        write!(f, "{}", self.monthly_orders)?;
        writeln!(f)?;

        writeln!(f, "Analysis Summary")?;
        writeln!(f, "  Best Performing Month: {}", self.analysis.best_month.unwrap_or(blank))?;
        writeln!(f, "  Lowest Performing Month: {}", self.analysis.worst_month.unwrap_or(blank))?;
        writeln!(f, "  Peak Sales Hour: {}", self.analysis.peak_hour.as_deref().unwrap_or(blank))?;
        writeln!(f)?;

        writeln!(f, "Number of Orders by Hour of Day in {}", self.state.city)?;
        for row in &self.heatmap {
            writeln!(f, "  {}  {}", row.label, row.count)?;
        }
        writeln!(f)?;

        for ranking in &self.rankings {
            write!(f, "{}", ranking)?;
            writeln!(f)?;
        }

        writeln!(f, "{}", self.state_map.title)?;
        for state in &self.state_map.states {
            writeln!(f, "  {}  {}", state.state, format_currency(state.value, 0))?;
        }
        if self.state_map.unattributed > Amount::ZERO {
            writeln!(f, "  unknown  {}", format_currency(self.state_map.unattributed, 0))?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "Sales Data: showing {} of {} rows, {} located",
            self.table.rows.len(),
            self.table.total_rows,
            self.location_points.len(),
        )
    }
}
