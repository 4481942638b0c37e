use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::time::Duration;

use crate::error::AppError;
use crate::store::VisitFeed;
use crate::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

pub fn router() -> Router<AppState> {
    Router::new().route("/stream/visits", get(stream_visits))
}

/// Server-sent events, one `data:` record per newly created visit.
///
/// The subscription lives as long as the response body: when the client
/// goes away axum drops the stream and the feed with it. A feed error sends
/// one final `error` event and ends the response.
async fn stream_visits(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let feed = state
        .visits
        .stream()
        .map_err(AppError::internal("unable to open visit stream"))?;

    tracing::info!(subscribers = state.visits.subscriber_count(), "visit stream opened");
    let events = stream::unfold(Some(feed), |feed: Option<VisitFeed>| async move {
        let mut feed = feed?;
        match feed.next().await {
            Ok(Some(visit)) => match serde_json::to_string(&visit) {
                Ok(json) => Some((Ok(Event::default().data(json)), Some(feed))),
                Err(e) => {
                    tracing::error!("unable to encode visit {}: {e}", visit.id);
                    Some((Ok(error_event()), None))
                }
            },
            Ok(None) => {
                tracing::info!("visit feed ended");
                None
            }
            Err(e) => {
                tracing::warn!("closing visit stream: {e}");
                Some((Ok(error_event()), None))
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)))
}

fn error_event() -> Event {
    Event::default().event("error").data("visit stream interrupted")
}
