pub use self::{
    city::{state_of, City, CityError},
    config::Config,
    engine::{Direction, EngineError, Highlights, LocationPoint, Metric, StateTotals, Subset, SummaryMetrics},
    loader::{LoadError, Table, REQUIRED_COLUMNS},
    present::DashboardView,
    selection::{Selection, SelectionError, ViewState, DEFAULT_TOP_N, MAX_TOP_N},
    session::Session,
    transaction::{parse_order_date, Amount, Transaction},
};

mod city;
mod config;
mod engine;
mod loader;
pub mod present;
mod selection;
mod session;
mod transaction;
