use log::{debug, info};

use crate::{City, Config, DashboardView, LoadError, Selection, SelectionError, Table, ViewState};

/// One user's dashboard
///
/// The session reads its table on first use and keeps it for its whole
/// lifetime. The dashboard view is recomputed lazily: changing the selection
/// only drops the cached view, the next call to [`Session::view`] rebuilds it.
#[derive(Debug)]
pub struct Session {
    config: Config,
    table: Option<Table>,
    selection: Selection,
    view: Option<DashboardView>,
}

impl Session {
    /// Creates a session that has not read its data source yet
    pub fn new(config: Config) -> Self {
        Self {
            selection: Selection::new(config.initial),
            config,
            table: None,
            view: None,
        }
    }

    /// Creates a session over an already loaded table
    pub fn with_table(config: Config, table: Table) -> Self {
        Self {
            table: Some(table),
            ..Self::new(config)
        }
    }

    /// The current selection
    pub fn state(&self) -> ViewState {
        self.selection.state()
    }

    /// Registers a callback run after every effective selection change
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ViewState) + 'static) {
        self.selection.subscribe(subscriber);
    }

    /// Selects another city
    pub fn select_city(&mut self, city: City) {
        if self.selection.set_city(city) {
            self.view = None;
        }
    }

    /// Changes the number of products in the rankings
    pub fn set_top_n(&mut self, top_n: u32) -> Result<(), SelectionError> {
        if self.selection.set_top_n(top_n)? {
            self.view = None;
        }
        Ok(())
    }

    /// Forgets the loaded table, the next view reads the data source again
    pub fn reload(&mut self) {
        info!("dropping cached table of {}", self.config.data_path.display());
        self.table = None;
        self.view = None;
    }

    /// The loaded table, reading it if necessary
    pub fn table(&mut self) -> Result<&Table, LoadError> {
        let table = match self.table.take() {
            Some(table) => table,
            None => Table::load(&self.config.data_path)?,
        };

        Ok(self.table.insert(table))
    }

    /// The dashboard for the current selection
    ///
    /// A cached view is only handed out while it was computed for the
    /// current selection.
    pub fn view(&mut self) -> Result<&DashboardView, LoadError> {
        let state = self.selection.state();
        let view = match self.view.take() {
            Some(view) if view.state == state => view,
            _ => {
                let preview_rows = self.config.preview_rows;
                debug!("recomputing dashboard for {:?}", state);

                DashboardView::compute(self.table()?, state, preview_rows)
            }
        };

        Ok(self.view.insert(view))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Amount;

    const SALES: &str = r#"order_date, city, product, quantity_ordered, price_each
        10/01/2019 21:30, Dallas (TX), Lightning Cable, 3, 10
        11/01/2019 21:45, Dallas (TX), Lightning Cable, 2, 10
        02/02/2019 09:00, Dallas (TX), Wired Headphones, 1, 5
        11/03/2019 08:10, Boston (MA), iPhone, 1, 700"#;

    fn session() -> Session {
        let table = Table::from_reader(SALES.as_bytes()).unwrap();
        Session::with_table(Config::new("unused.csv"), table)
    }

    #[test]
    fn switching_cities_recomputes_everything() {
        let mut session = session();
        let dallas = session.view().unwrap().clone();

        session.select_city(City::Boston);
        let boston = session.view().unwrap().clone();

        assert_eq!(boston.value_boxes.metrics.total_sales, Amount::from(700));
        assert_eq!(boston.value_boxes.metrics.total_orders, 1);
        assert_eq!(boston.analysis.best_month, Some("March"));
        assert_eq!(boston.monthly_orders.bars.len(), 1);

        session.select_city(City::Dallas);
        assert_eq!(session.view().unwrap(), &dallas);
    }

    #[test]
    fn stale_view_is_never_served() {
        let mut session = session();
        assert_eq!(session.view().unwrap().state.city, City::Dallas);

        // a change that bypasses `select_city` must not leave the old view behind
        assert!(session.selection.set_city(City::Boston));
        let view = session.view().unwrap();

        assert_eq!(view.state.city, City::Boston);
        assert_eq!(view.value_boxes.metrics.total_sales, Amount::from(700));
        assert_eq!(view.table.total_rows, 1);
    }

    #[test]
    fn empty_city_does_not_fail() {
        let mut session = session();
        session.select_city(City::PortlandMaine);
        let view = session.view().unwrap();

        assert_eq!(view.value_boxes.metrics.total_orders, 0);
        assert_eq!(view.analysis.best_month, None);
        assert_eq!(view.heatmap.len(), 24);
    }

    #[test]
    fn top_n_changes_rankings() {
        let mut session = session();
        assert_eq!(session.view().unwrap().rankings[0].bars.len(), 2);

        session.set_top_n(1).unwrap();
        assert_eq!(session.view().unwrap().rankings[0].bars.len(), 1);
        assert_eq!(session.view().unwrap().rankings[0].title, "Top 1 Products by Quantity Sold");

        assert!(session.set_top_n(21).is_err());
        assert_eq!(session.state().top_n, 1);
    }

    #[test]
    fn subscribers_see_changes() {
        let mut session = session();
        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        session.subscribe(move |_| counter.set(counter.get() + 1));

        session.select_city(City::Boston);
        session.select_city(City::Boston);
        session.set_top_n(7).unwrap();

        assert_eq!(changes.get(), 2);
    }

    #[test]
    fn table_is_read_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, SALES.as_bytes()).unwrap();
        let mut session = Session::new(Config::new(file.path()));

        assert_eq!(session.table().unwrap().len(), 4);

        // the memoized table survives the source changing underneath
        std::fs::write(file.path(), "not,a,sales,file\n").unwrap();
        session.select_city(City::Boston);
        assert_eq!(session.view().unwrap().table.total_rows, 1);

        session.reload();
        assert!(matches!(session.view(), Err(LoadError::MalformedRow { .. })));
    }

    #[test]
    fn missing_source_is_reported() {
        let mut session = Session::new(Config::new("/definitely/not/here.csv"));

        assert!(matches!(session.view(), Err(LoadError::SourceUnavailable { .. })));
    }
}
