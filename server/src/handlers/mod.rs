use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::{info, warn};

use crate::models::{Event, EventSummary, EventView, NewEvent, QualityQuery};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::validation::Validate;

pub async fn hello() -> &'static str {
    "Welcome to the events service\n"
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> Result<Json<Event>, AppError> {
    let Json(input) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let draft = input.validate(&state.settings)?;

    let event = state.repo.create(draft).await?;
    info!(event_id = event.id, "Event created");

    Ok(Json(event))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<EventView>, AppError> {
    let query = QualityQuery::from_pairs(pairs);
    let id: i64 = raw_id
        .parse()
        .map_err(|_| AppError::InvalidId(raw_id.clone()))?;

    let video = preference_or(query.video_quality, &state.settings.default_video_quality);
    let audio = preference_or(query.audio_quality, &state.settings.default_audio_quality);

    // Any lookup failure is reported as a missing event.
    let view = state
        .repo
        .get_one(id, &video, &audio)
        .await
        .map_err(|e| {
            warn!(event_id = id, error = %e, "Event lookup failed");
            AppError::NotFound(id)
        })?;

    Ok(Json(view))
}

/// GET /events
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<EventSummary>>, AppError> {
    let all = state.repo.get_all().await?;
    Ok(Json(all))
}

fn preference_or(requested: Option<String>, default: &str) -> String {
    requested
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| default.to_string())
}
