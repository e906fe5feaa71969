use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::transaction::{parse_order_date, RawTransaction};
use crate::{City, Subset, Transaction};

/// Columns every sales CSV must provide
pub const REQUIRED_COLUMNS: [&str; 4] = ["order_date", "city", "quantity_ordered", "price_each"];

/// Possible errors to occur while loading the transaction table
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("The data source `{}` is unavailable: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed row on line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error("Invalid order date `{value}` on line {line}, expected a day-first date")]
    InvalidTimestamp { line: u64, value: String },
}

/// The immutable table of all transactions of one data source
///
/// The table is loaded once and never mutated afterwards. All views are
/// computed from [`Subset`]s of it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    rows: Vec<Transaction>,
}

impl Table {
    /// Creates a table from already parsed transactions
    pub fn new(rows: Vec<Transaction>) -> Self {
        Self { rows }
    }

    /// Reads the table from a CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let unavailable = |source| LoadError::SourceUnavailable {
            path: path.to_owned(),
            source,
        };

        debug!("loading transactions from {}", path.display());
        let file = std::fs::File::open(path).map_err(unavailable)?;
        let table = Self::from_reader(file).map_err(|err| match err {
            LoadError::SourceUnavailable { source, .. } => unavailable(source),
            err => err,
        })?;
        info!("loaded {} transactions from {}", table.len(), path.display());

        Ok(table)
    }

    /// Reads the table from any CSV source
    ///
    /// The whole load fails on the first row that cannot be parsed; rows are
    /// never skipped or coerced.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(|err| csv_error(err, 1))?.clone();
        let missing = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|header| header == **column))
            .copied()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(LoadError::MalformedRow {
                line: 1,
                reason: format!("missing required columns: {}", missing.join(", ")),
            });
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let line = rows.len() as u64 + 2;
            let record = record.map_err(|err| csv_error(err, line))?;
            let line = record.position().map_or(line, |position| position.line());

            let raw = record
                .deserialize::<RawTransaction>(Some(&headers))
                .map_err(|err| csv_error(err, line))?;
            let order_date = parse_order_date(&raw.order_date)
                .ok_or_else(|| LoadError::InvalidTimestamp {
                    line,
                    value: raw.order_date.clone(),
                })?;

            if raw.price_each.is_sign_negative() {
                return Err(LoadError::MalformedRow {
                    line,
                    reason: format!("negative price_each `{}`", raw.price_each),
                });
            }

            let transaction = Transaction::from_raw(raw, order_date);
            if transaction.checked_value().is_none() {
                return Err(LoadError::MalformedRow {
                    line,
                    reason: "quantity_ordered times price_each is out of range".to_owned(),
                });
            }
            rows.push(transaction);
        }
        debug!("parsed {} rows", rows.len());

        Ok(Self { rows })
    }

    /// All transactions in source order
    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    /// The number of transactions
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no transactions at all
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows whose city matches exactly
    pub fn subset(&self, city: City) -> Subset<'_> {
        Subset::new(
            self.rows
                .iter()
                .filter(|row| row.city() == city.as_str())
                .collect(),
        )
    }

    /// A subset over every row, used for whole-table views like the state map
    pub fn all(&self) -> Subset<'_> {
        Subset::new(self.rows.iter().collect())
    }
}

fn csv_error(err: csv::Error, line: u64) -> LoadError {
    let line = err.position().map_or(line, |position| position.line());
    if !err.is_io_error() {
        return LoadError::MalformedRow {
            line,
            reason: err.to_string(),
        };
    }

    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::SourceUnavailable {
            path: PathBuf::new(),
            source,
        },
        kind => LoadError::MalformedRow {
            line,
            reason: format!("{:?}", kind),
        },
    }
}
