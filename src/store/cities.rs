use sqlx::SqlitePool;

use super::Error;
use crate::models::City;
use crate::states;

/// Reference data about known cities, keyed by `"<name>,<state>"`.
#[derive(Clone)]
pub struct CityCatalog {
    pool: SqlitePool,
}

impl CityCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn validate_state(&self, code: &str) -> Result<(), Error> {
        match states::name_of(code.trim()) {
            Some(_) => Ok(()),
            None => Err(Error::NoSuchState),
        }
    }

    /// Only the state is checked; unknown cities are accepted.
    pub fn validate_city(&self, city: &City) -> Result<(), Error> {
        self.validate_state(&city.state)
    }

    /// Names of catalog cities in a state, alphabetically.
    pub async fn city_names_in_state(&self, code: &str) -> Result<Vec<String>, Error> {
        sqlx::query_scalar("SELECT name FROM cities WHERE state = ? ORDER BY name")
            .bind(code.trim().to_uppercase())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::store("unable to get cities"))
    }

    /// Insert a city, failing with [`Error::AlreadyExists`] if its id is taken.
    pub async fn add_city(&self, city: &City) -> Result<(), Error> {
        let result = sqlx::query(
            "INSERT INTO cities (id, name, state, latitude, longitude, verified) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&city.id)
        .bind(&city.name)
        .bind(&city.state)
        .bind(city.location.map(|l| l.latitude))
        .bind(city.location.map(|l| l.longitude))
        .bind(city.verified)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::debug!(city_id = %city.id, "city added");
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::AlreadyExists),
            Err(e) => Err(Error::store("unable to add city")(e)),
        }
    }
}
