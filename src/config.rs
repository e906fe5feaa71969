use std::path::PathBuf;

use crate::present::DEFAULT_PREVIEW_ROWS;
use crate::{City, SelectionError, ViewState};

/// Everything a session needs to know before it starts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The CSV file the transactions are read from
    pub data_path: PathBuf,
    /// The selection a new session starts with
    pub initial: ViewState,
    /// How many rows the table preview holds
    pub preview_rows: usize,
}

impl Config {
    /// Creates a configuration reading from `data_path` with default settings
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            initial: ViewState::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    /// Sets the city and ranking size a new session starts with
    pub fn with_selection(mut self, city: City, top_n: u32) -> Result<Self, SelectionError> {
        self.initial = ViewState::new(city, top_n)?;
        Ok(self)
    }

    /// Sets the number of rows of the table preview
    pub fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }
}
