use log::debug;

use crate::City;

/// The largest ranking size a selection accepts
pub const MAX_TOP_N: u8 = 20;

/// The ranking size used when none was chosen
pub const DEFAULT_TOP_N: u8 = 5;

/// Possible errors to occur when changing the selection
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("The number of items must be between 0 and 20, got {0}")]
    TopNOutOfRange(u32),
}

/// Everything a dashboard view depends on besides the table itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ViewState {
    pub city: City,
    pub top_n: u8,
}

impl ViewState {
    /// Creates a view state, validating the ranking size
    pub fn new(city: City, top_n: u32) -> Result<Self, SelectionError> {
        Ok(Self {
            city,
            top_n: check_top_n(top_n)?,
        })
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            city: City::ALL[0],
            top_n: DEFAULT_TOP_N,
        }
    }
}

type Subscriber = Box<dyn FnMut(&ViewState)>;

/// The session's current filter selection
///
/// Subscribers are called synchronously after every change that actually
/// modifies the state. Setting a value to what it already is notifies nobody.
#[derive(Default)]
pub struct Selection {
    state: ViewState,
    subscribers: Vec<Subscriber>,
}

impl Selection {
    /// Creates a selection starting at the given state
    pub fn new(state: ViewState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
        }
    }

    /// The current state
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Registers a callback for every future change
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ViewState) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Selects another city
    ///
    /// Returns whether the selection changed.
    pub fn set_city(&mut self, city: City) -> bool {
        self.update(ViewState { city, ..self.state })
    }

    /// Changes the ranking size
    ///
    /// Returns whether the selection changed.
    pub fn set_top_n(&mut self, top_n: u32) -> Result<bool, SelectionError> {
        let top_n = check_top_n(top_n)?;
        Ok(self.update(ViewState { top_n, ..self.state }))
    }

    fn update(&mut self, state: ViewState) -> bool {
        if state == self.state {
            return false;
        }

        debug!("selection changed from {:?} to {:?}", self.state, state);
        self.state = state;
        for subscriber in &mut self.subscribers {
            subscriber(&self.state);
        }

        true
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

fn check_top_n(top_n: u32) -> Result<u8, SelectionError> {
    match top_n {
        n if n <= u32::from(MAX_TOP_N) => Ok(n as u8),
        n => Err(SelectionError::TopNOutOfRange(n)),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recording(selection: &mut Selection) -> Rc<RefCell<Vec<ViewState>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        selection.subscribe(move |state| sink.borrow_mut().push(*state));
        seen
    }

    #[test]
    fn notifies_on_change() {
        let mut selection = Selection::default();
        let seen = recording(&mut selection);

        assert!(selection.set_city(City::Boston));
        assert_eq!(selection.set_top_n(10), Ok(true));

        assert_eq!(
            *seen.borrow(),
            vec![
                ViewState { city: City::Boston, top_n: DEFAULT_TOP_N },
                ViewState { city: City::Boston, top_n: 10 },
            ],
        );
    }

    #[test]
    fn unchanged_values_notify_nobody() {
        let mut selection = Selection::new(ViewState { city: City::Austin, top_n: 3 });
        let seen = recording(&mut selection);

        assert!(!selection.set_city(City::Austin));
        assert_eq!(selection.set_top_n(3), Ok(false));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn top_n_is_bounded() {
        let mut selection = Selection::default();
        let seen = recording(&mut selection);

        assert_eq!(selection.set_top_n(0), Ok(true));
        assert_eq!(selection.set_top_n(20), Ok(true));
        assert_eq!(selection.set_top_n(21), Err(SelectionError::TopNOutOfRange(21)));
        assert_eq!(selection.state().top_n, 20);
        assert_eq!(seen.borrow().len(), 2);

        assert!(ViewState::new(City::Dallas, 100).is_err());
    }
}
