use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};

use super::CitiesBody;
use crate::content::{Format, Negotiated};
use crate::error::AppError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/states/{state}/cities", get(list_cities_in_state))
}

async fn list_cities_in_state(
    State(state): State<AppState>,
    Path(code): Path<String>,
    format: Format,
) -> Result<Negotiated<CitiesBody>, AppError> {
    if state.cities.validate_state(&code).is_err() {
        return Err(AppError::NotFound("no such state".to_string()));
    }

    let cities = state
        .cities
        .city_names_in_state(&code)
        .await
        .map_err(AppError::internal("unable to get cities"))?;

    Ok(format.respond("cities", CitiesBody { cities }))
}
