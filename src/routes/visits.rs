use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use serde::Serialize;

use super::CitiesBody;
use crate::content::{Decoded, Format, Negotiated};
use crate::error::AppError;
use crate::models::{City, Visit};
use crate::pagination::Page;
use crate::states;
use crate::store::VisitStore;
use crate::AppState;

#[derive(Serialize)]
struct VisitsBody {
    visits: Vec<Visit>,
}

#[derive(Serialize)]
struct StatesBody {
    states: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{user}/visits", get(list_user_visits).post(create_user_visit))
        .route("/users/{user}/visits/{visit}", delete(delete_user_visit))
        .route("/users/{user}/visits/cities", get(list_user_cities))
        .route("/users/{user}/visits/states", get(list_user_states))
}

async fn create_user_visit(
    State(state): State<AppState>,
    Path(user): Path<String>,
    format: Format,
    Decoded(mut visit): Decoded<Visit>,
) -> Result<Negotiated<Visit>, AppError> {
    VisitStore::validate(&visit).map_err(AppError::invalid_visit)?;
    visit.user = user;

    // Unknown cities are fine, unknown states are not.
    let city = City::from_visit(&visit);
    state
        .cities
        .validate_city(&city)
        .map_err(AppError::invalid_visit)?;

    state
        .visits
        .add(&mut visit)
        .await
        .map_err(AppError::internal("unable to save user visit"))?;

    tracing::info!(visit_id = %visit.id, user = %visit.user, "visit recorded");
    Ok(format.respond("visit", visit))
}

async fn delete_user_visit(
    State(state): State<AppState>,
    Path((_user, visit_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .visits
        .delete(&visit_id)
        .await
        .map_err(AppError::internal("unable to delete user visit"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_user_visits(
    State(state): State<AppState>,
    Path(user): Path<String>,
    page: Page,
    format: Format,
) -> Result<Negotiated<VisitsBody>, AppError> {
    let visits = state
        .visits
        .get_visits(&user, page.start, page.limit)
        .await
        .map_err(AppError::internal("unable to get visits"))?;

    Ok(format.respond("visits", VisitsBody { visits }))
}

async fn list_user_cities(
    State(state): State<AppState>,
    Path(user): Path<String>,
    format: Format,
) -> Result<Negotiated<CitiesBody>, AppError> {
    let cities = state
        .visits
        .get_cities(&user)
        .await
        .map_err(AppError::internal("unable to get visited cities"))?;

    Ok(format.respond("cities", CitiesBody { cities }))
}

async fn list_user_states(
    State(state): State<AppState>,
    Path(user): Path<String>,
    format: Format,
) -> Result<Negotiated<StatesBody>, AppError> {
    let codes = state
        .visits
        .get_states(&user)
        .await
        .map_err(AppError::internal("unable to get visited states"))?;

    let states = codes
        .into_iter()
        .map(|code| match states::name_of(&code) {
            Some(name) => name.to_string(),
            None => code,
        })
        .collect();

    Ok(format.respond("states", StatesBody { states }))
}
