use serde::{Deserialize, Serialize};

use super::Visit;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Catalog entry for a known city. The id is always `"<name>,<state>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip)]
    pub verified: bool,
}

impl City {
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        let name = name.into();
        let state = state.into();
        Self {
            id: format!("{},{}", name, state),
            name,
            state,
            location: None,
            verified: false,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The catalog entry a visit refers to. The city does not have to exist
    /// in the catalog for this to be meaningful.
    pub fn from_visit(visit: &Visit) -> Self {
        Self::new(visit.city.clone(), visit.state.clone())
    }
}
