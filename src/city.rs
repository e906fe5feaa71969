/// Possible errors to occur when selecting a city
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CityError {
    #[error("Unknown city `{0}`")]
    Unknown(String),
}

/// The closed set of cities a dashboard can be filtered by
///
/// The string form of every city embeds the state abbreviation in
/// parentheses, exactly the way it appears in the `city` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum City {
    Dallas,
    Boston,
    LosAngeles,
    SanFrancisco,
    Seattle,
    Atlanta,
    NewYorkCity,
    PortlandOregon,
    Austin,
    PortlandMaine,
}

impl City {
    /// All selectable cities, in selector order
    pub const ALL: [City; 10] = [
        City::Dallas,
        City::Boston,
        City::LosAngeles,
        City::SanFrancisco,
        City::Seattle,
        City::Atlanta,
        City::NewYorkCity,
        City::PortlandOregon,
        City::Austin,
        City::PortlandMaine,
    ];

    /// The city exactly as it appears in the data
    pub fn as_str(self) -> &'static str {
        match self {
            City::Dallas => "Dallas (TX)",
            City::Boston => "Boston (MA)",
            City::LosAngeles => "Los Angeles (CA)",
            City::SanFrancisco => "San Francisco (CA)",
            City::Seattle => "Seattle (WA)",
            City::Atlanta => "Atlanta (GA)",
            City::NewYorkCity => "New York City (NY)",
            City::PortlandOregon => "Portland (OR)",
            City::Austin => "Austin (TX)",
            City::PortlandMaine => "Portland (ME)",
        }
    }

    /// The state abbreviation of the city
    pub fn state(self) -> &'static str {
        // every entry of `ALL` carries a suffix
        state_of(self.as_str()).unwrap_or_default()
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for City {
    type Err = CityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        City::ALL
            .into_iter()
            .find(|city| city.as_str() == s)
            .ok_or_else(|| CityError::Unknown(s.to_owned()))
    }
}

impl serde::Serialize for City {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Extracts the state from the trailing parenthesized token of a city field
///
/// `"Dallas (TX)"` yields `Some("TX")`. Fields without a closing parenthesized
/// token, or with an empty one, yield `None`.
pub fn state_of(city: &str) -> Option<&str> {
    let city = city.trim_end();
    let inner = city.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let state = inner[open + 1..].trim();

    match state.is_empty() {
        true => None,
        false => Some(state),
    }
}
