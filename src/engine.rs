use std::collections::BTreeMap;

use chrono::Month;
use log::{debug, warn};

use crate::city::state_of;
use crate::transaction::MONTHS;
use crate::{Amount, Transaction};

/// Possible errors to occur while aggregating a subset
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("The selected city has no transactions")]
    EmptySubset,
}

/// The quantity a series or ranking is computed over
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Units ordered
    Quantity,
    /// Line value, quantity times unit price
    Value,
}

impl Metric {
    fn measure(self, row: &Transaction) -> Amount {
        match self {
            Metric::Quantity => Amount::from(row.quantity()),
            Metric::Value => row.value(),
        }
    }
}

/// Which end of a ranking to take
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Largest,
    Smallest,
}

/// The headline numbers of a subset
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SummaryMetrics {
    /// Sum of all line values
    pub total_sales: Amount,
    /// Sum of all quantities ordered
    pub total_orders: u64,
    /// `total_sales / total_orders`, or zero without any orders
    pub avg_order_value: Amount,
}

/// Best and worst month by value, and the hour with the most units sold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlights {
    pub best_month: Month,
    pub worst_month: Month,
    pub peak_hour: u8,
}

/// Sales value per state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateTotals {
    /// Totals keyed by state abbreviation
    pub by_state: BTreeMap<String, Amount>,
    /// Value of rows whose city carries no parenthesized state
    pub unattributed: Amount,
}

/// A single weighted point of the location heatmap
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LocationPoint {
    pub lat: f64,
    pub long: f64,
    pub quantity: u32,
}

/// A view on the rows of a table matching a filter
///
/// Every aggregation starts from fresh accumulators, so two subsets of the
/// same table never influence each other.
#[derive(Clone, Debug, Default)]
pub struct Subset<'a> {
    rows: Vec<&'a Transaction>,
}

impl<'a> Subset<'a> {
    /// Creates a subset from the selected rows
    pub fn new(rows: Vec<&'a Transaction>) -> Self {
        Self { rows }
    }

    /// The selected rows in source order
    pub fn rows(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        self.rows.iter().copied()
    }

    /// The number of selected rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row was selected
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total sales, total orders and the average order value
    pub fn summary_metrics(&self) -> SummaryMetrics {
        let total_sales = self.total(Metric::Value);
        let total_orders = self.rows
            .iter()
            .map(|row| u64::from(row.quantity()))
            .sum::<u64>();
        let avg_order_value = match total_orders {
            0 => Amount::ZERO,
            orders => total_sales / Amount::from(orders),
        };

        SummaryMetrics {
            total_sales,
            total_orders,
            avg_order_value,
        }
    }

    /// Totals per month in calendar order
    ///
    /// Only months that occur in the subset are returned.
    pub fn monthly_series(&self, metric: Metric) -> Vec<(Month, Amount)> {
        let totals = self.by_month(metric);

        MONTHS
            .into_iter()
            .zip(totals)
            .filter_map(|(month, total)| Some((month, total?)))
            .collect()
    }

    /// Number of rows per hour of day
    ///
    /// Always returns all 24 hours in order, hours without rows count zero.
    pub fn hourly_series(&self) -> [(u8, u64); 24] {
        let mut counts = [0u64; 24];
        for row in &self.rows {
            counts[usize::from(row.hour())] += 1;
        }

        let mut series = [(0u8, 0u64); 24];
        for (hour, (entry, count)) in series.iter_mut().zip(counts).enumerate() {
            *entry = (hour as u8, count);
        }

        series
    }

    /// The `n` products with the largest or smallest total
    ///
    /// Products are grouped by name in ascending order and sorted stably, so
    /// products with equal totals keep their name order. Rows without a
    /// product are not ranked.
    pub fn top_n(&self, metric: Metric, n: usize, direction: Direction) -> Vec<(String, Amount)> {
        let mut totals = BTreeMap::<&str, Amount>::new();
        for row in &self.rows {
            if let Some(product) = row.product() {
                let total = totals.entry(product).or_insert(Amount::ZERO);
                *total = total.saturating_add(metric.measure(row));
            }
        }

        let mut ranking = totals.into_iter().collect::<Vec<_>>();
        match direction {
            Direction::Largest => ranking.sort_by(|a, b| b.1.cmp(&a.1)),
            Direction::Smallest => ranking.sort_by(|a, b| a.1.cmp(&b.1)),
        }
        ranking.truncate(n);

        ranking
            .into_iter()
            .map(|(product, total)| (product.to_owned(), total))
            .collect()
    }

    /// The best and worst month by value and the peak hour by quantity
    ///
    /// Ties resolve to the earliest month, or hour respectively.
    pub fn best_worst_month(&self) -> Result<Highlights, EngineError> {
        let mut best: Option<(Month, Amount)> = None;
        let mut worst: Option<(Month, Amount)> = None;
        for (month, total) in self.monthly_series(Metric::Value) {
            if best.map_or(true, |(_, best)| total > best) {
                best = Some((month, total));
            }
            if worst.map_or(true, |(_, worst)| total < worst) {
                worst = Some((month, total));
            }
        }

        let mut hours = [None::<u64>; 24];
        for row in &self.rows {
            *hours[usize::from(row.hour())].get_or_insert(0) += u64::from(row.quantity());
        }
        let mut peak: Option<(u8, u64)> = None;
        for (hour, quantity) in hours.into_iter().enumerate() {
            let quantity = match quantity {
                Some(quantity) => quantity,
                None => continue,
            };
            if peak.map_or(true, |(_, peak)| quantity > peak) {
                peak = Some((hour as u8, quantity));
            }
        }

        match (best, worst, peak) {
            (Some((best_month, _)), Some((worst_month, _)), Some((peak_hour, _))) => Ok(Highlights {
                best_month,
                worst_month,
                peak_hour,
            }),
            _ => Err(EngineError::EmptySubset),
        }
    }

    /// Sales value per state, taken from the city's parenthesized suffix
    pub fn state_totals(&self) -> StateTotals {
        let mut totals = StateTotals::default();
        let mut unattributed_rows = 0usize;

        for row in &self.rows {
            match state_of(row.city()) {
                Some(state) => {
                    let total = totals.by_state
                        .entry(state.to_owned())
                        .or_insert(Amount::ZERO);
                    *total = total.saturating_add(row.value());
                }
                None => {
                    unattributed_rows += 1;
                    totals.unattributed = totals.unattributed.saturating_add(row.value());
                }
            }
        }

        if unattributed_rows > 0 {
            warn!("{} rows have a city without a state suffix", unattributed_rows);
        }
        debug!("aggregated sales for {} states", totals.by_state.len());

        totals
    }

    /// The coordinates of every row that has them, weighted by quantity
    pub fn location_points(&self) -> Vec<LocationPoint> {
        self.rows
            .iter()
            .filter_map(|row| {
                let (lat, long) = row.location()?;
                Some(LocationPoint {
                    lat,
                    long,
                    quantity: row.quantity(),
                })
            })
            .collect()
    }

    fn total(&self, metric: Metric) -> Amount {
        self.rows
            .iter()
            .fold(Amount::ZERO, |total, row| total.saturating_add(metric.measure(row)))
    }

    fn by_month(&self, metric: Metric) -> [Option<Amount>; 12] {
        let mut totals = [None; 12];
        for row in &self.rows {
            let month = row.month().number_from_month() as usize - 1;
            let total = totals[month].get_or_insert(Amount::ZERO);
            *total = total.saturating_add(metric.measure(row));
        }

        totals
    }
}
