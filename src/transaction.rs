use chrono::{Datelike, Month, NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;

/// The monetary and quantity representation used throughout the crate
///
/// Decimal, so cent prices like `11.95` are held exactly.
pub type Amount = Decimal;

/// Calendar months, indexed by `month0`
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Day-first formats with a time of day
///
/// Two digit years come first, since `%Y` would happily accept `19` as the
/// year 19.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Day-first formats without a time of day
const DATE_FORMATS: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// Parses an order date using the day-first convention
///
/// Unambiguous ISO dates (year first) are accepted as well. Month-first dates
/// are never tried, so `01/13/2019` is rejected instead of being read as the
/// 13th of January.
pub fn parse_order_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// One row of the sales CSV, before any derived columns are computed
#[derive(Debug, serde::Deserialize)]
pub(crate) struct RawTransaction {
    pub(crate) order_date: String,
    pub(crate) city: String,
    #[serde(default)]
    pub(crate) product: Option<String>,
    pub(crate) quantity_ordered: u32,
    pub(crate) price_each: Amount,
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    #[serde(default)]
    pub(crate) long: Option<f64>,
}

/// One sold line item
///
/// The line value, month and hour are derived from the stored fields every
/// time they are requested, so they can never drift from their inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    order_date: NaiveDateTime,
    city: String,
    product: Option<String>,
    quantity: u32,
    price: Amount,
    location: Option<(f64, f64)>,
}

impl Transaction {
    /// Creates a new transaction without coordinates
    pub fn new(
        order_date: NaiveDateTime,
        city: impl Into<String>,
        product: impl Into<String>,
        quantity: u32,
        price: Amount,
    ) -> Self {
        Self {
            order_date,
            city: city.into(),
            product: Some(product.into()),
            quantity,
            price,
            location: None,
        }
    }

    /// Attaches a latitude/longitude pair to the transaction
    pub fn with_location(mut self, lat: f64, long: f64) -> Self {
        self.location = Some((lat, long));
        self
    }

    pub(crate) fn from_raw(raw: RawTransaction, order_date: NaiveDateTime) -> Self {
        let location = match (raw.lat, raw.long) {
            (Some(lat), Some(long)) => Some((lat, long)),
            _ => None,
        };

        Self {
            order_date,
            city: raw.city,
            product: raw.product.filter(|product| !product.trim().is_empty()),
            quantity: raw.quantity_ordered,
            price: raw.price_each,
            location,
        }
    }

    /// The time the order was placed
    pub fn order_date(&self) -> NaiveDateTime {
        self.order_date
    }

    /// The city, including its parenthesized state suffix
    pub fn city(&self) -> &str {
        &self.city
    }

    /// The product name, if the row named one
    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    /// The number of units ordered
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The price of a single unit
    pub fn price(&self) -> Amount {
        self.price
    }

    /// The line value: quantity times unit price
    ///
    /// Saturates at [`Amount::MAX`]. Loaded rows are checked with
    /// [`Transaction::checked_value`] and never get there.
    pub fn value(&self) -> Amount {
        self.checked_value().unwrap_or(Amount::MAX)
    }

    /// The line value, or `None` if it does not fit into an [`Amount`]
    pub fn checked_value(&self) -> Option<Amount> {
        self.price.checked_mul(Amount::from(self.quantity))
    }

    /// The calendar month of the order
    pub fn month(&self) -> Month {
        MONTHS[self.order_date.month0() as usize]
    }

    /// The hour of day of the order, `0..=23`
    pub fn hour(&self) -> u8 {
        self.order_date.hour() as u8
    }

    /// Latitude and longitude, if both were present
    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }
}

impl serde::Serialize for Transaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        use serde::ser::SerializeStruct;
        let mut map = serializer.serialize_struct("Transaction", 10)?;

        map.serialize_field("order_date", &self.order_date.format("%Y-%m-%d %H:%M:%S").to_string())?;
        map.serialize_field("city", &self.city)?;
        map.serialize_field("product", &self.product)?;
        map.serialize_field("quantity_ordered", &self.quantity)?;
        map.serialize_field("price_each", &self.price)?;
        map.serialize_field("month", self.month().name())?;
        map.serialize_field("hour", &self.hour())?;
        map.serialize_field("value", &self.value())?;
        map.serialize_field("lat", &self.location.map(|(lat, _)| lat))?;
        map.serialize_field("long", &self.location.map(|(_, long)| long))?;

        map.end()
    }
}
