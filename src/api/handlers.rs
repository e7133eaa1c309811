//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    events::{adjust_all, adjust_event, parse_backend_match_id, EventRequest},
    state::AppState,
    timer::{format_elapsed, model::validate_match_id},
    video::layout_markers,
};
use super::responses::{
    DelayAdjustmentRequest, DelayAdjustmentResponse, ErrorResponse, EventResponse, HealthResponse,
    MarkerLayoutRequest, MarkerLayoutResponse, StatusResponse, TimerResponse,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: String) -> ApiError {
    warn!("Rejected request: {}", message);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn not_found(message: String) -> ApiError {
    warn!("Not found: {}", message);
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message)))
}

fn internal_error(context: &str, message: String) -> ApiError {
    error!("{}: {}", context, message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("{}: {}", context, message))),
    )
}

/// Handle GET /matches/:match_id/timer - Current timer value
pub async fn timer_handler(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    validate_match_id(&match_id).map_err(bad_request)?;

    match state.timer_snapshot(&match_id) {
        Ok(timer) => Ok(Json(TimerResponse::for_state(
            format!("Match {} at {}", match_id, timer.formatted),
            timer,
        ))),
        Err(e) => Err(internal_error("Failed to read timer", e)),
    }
}

/// Handle POST /matches/:match_id/timer/toggle - Start or pause
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    validate_match_id(&match_id).map_err(bad_request)?;

    match state.toggle_timer(&match_id) {
        Ok(timer) => {
            let message = if timer.running {
                format!("Timer started at {}", timer.formatted)
            } else {
                format!("Timer paused at {}", timer.formatted)
            };
            Ok(Json(TimerResponse::for_state(message, timer)))
        }
        Err(e) => Err(internal_error("Failed to toggle timer", e)),
    }
}

/// Handle POST /matches/:match_id/timer/reset - Back to 00:00
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    validate_match_id(&match_id).map_err(bad_request)?;

    match state.reset_timer(&match_id) {
        Ok(timer) => Ok(Json(TimerResponse::new(
            "reset".to_string(),
            "Timer reset".to_string(),
            timer,
        ))),
        Err(e) => Err(internal_error("Failed to reset timer", e)),
    }
}

/// Handle POST /matches/:match_id/events - Draft an event stamped with the clock
pub async fn event_handler(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<String>,
    Json(request): Json<EventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    validate_match_id(&match_id).map_err(bad_request)?;
    parse_backend_match_id(&match_id).map_err(bad_request)?;
    if let Some(ts) = request.video_timestamp {
        if !ts.is_finite() || ts < 0.0 {
            return Err(bad_request(format!("Invalid video timestamp: {}", ts)));
        }
    }

    match state.draft_event(&match_id, &request) {
        Ok(event) => Ok(Json(EventResponse {
            timestamp: Utc::now(),
            formatted_delay: format_elapsed(event.delay),
            label: event.kind.map(|kind| kind.describe()),
            event,
        })),
        Err(e) => Err(internal_error("Failed to draft event", e)),
    }
}

/// Handle POST /matches/:match_id/events/adjust - Delay corrections for logged events
pub async fn adjust_events_handler(
    Path(match_id): Path<String>,
    Json(request): Json<DelayAdjustmentRequest>,
) -> Result<Json<DelayAdjustmentResponse>, ApiError> {
    validate_match_id(&match_id).map_err(bad_request)?;
    parse_backend_match_id(&match_id).map_err(bad_request)?;

    let response = match request.event_id {
        Some(event_id) => {
            let event = request.events.iter()
                .find(|event| event.id == event_id)
                .ok_or_else(|| not_found(format!("Event {} not found in match {}", event_id, match_id)))?;
            DelayAdjustmentResponse::Single { patch: adjust_event(event, request.adjustment) }
        }
        None => {
            let patch = adjust_all(&request.events, request.adjustment)
                .ok_or_else(|| bad_request(format!("No events to adjust in match {}", match_id)))?;
            DelayAdjustmentResponse::Bulk { patch }
        }
    };

    info!("Delay adjustment of {}s planned for match {}", request.adjustment, match_id);
    Ok(Json(response))
}

/// Handle POST /video/markers - Timeline positions for markers
pub async fn markers_handler(Json(request): Json<MarkerLayoutRequest>) -> Json<MarkerLayoutResponse> {
    Json(MarkerLayoutResponse {
        duration: request.duration,
        markers: layout_markers(request.duration, &request.markers),
    })
}

/// Handle GET /status - Return current server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        running_matches: state.running_matches(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        refresh_interval_ms: state.refresh_interval.as_millis() as u64,
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
