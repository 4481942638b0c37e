use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One user having been to one city at a point in time.
///
/// `id`, `user` and `timestamp` are owned by the server: they are never read
/// from a request body, only from the path and the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Visit {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(skip_deserializing)]
    #[sqlx(rename = "user_id")]
    pub user: String,
    #[serde(skip_deserializing)]
    #[sqlx(rename = "created_at")]
    pub timestamp: String,
}

impl Visit {
    pub fn new(user: impl Into<String>, city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            city: city.into(),
            state: state.into(),
            user: user.into(),
            timestamp: String::new(),
        }
    }

    /// Stamp the fields the store owns. Timestamps are fixed-width so that
    /// they sort lexically in creation order.
    pub(crate) fn assign_identity(&mut self) {
        self.id = Uuid::new_v4().to_string();
        self.timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    }
}
