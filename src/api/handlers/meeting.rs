//! Meeting handlers: host, list, get, cancel, add and remove participants.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AddParticipantRequest, HostMeetingRequest, MeetingDto, MeetingListResponse,
    PaginationParams, ParticipantRemovedResponse,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /meetings` — Host a new meeting.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid range, a taken title, an unknown
/// user, or a time conflict for the host or any participant.
#[utoipa::path(
    post,
    path = "/api/v1/meetings",
    tag = "Meetings",
    summary = "Host a meeting",
    description = "Creates a meeting after checking that the range is non-empty, the title is free, and neither the host nor any participant is already busy during the range. Back-to-back meetings are allowed.",
    request_body = HostMeetingRequest,
    responses(
        (status = 201, description = "Meeting hosted", body = MeetingDto),
        (status = 400, description = "End is not after start", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
        (status = 409, description = "Duplicate title or time conflict", body = ErrorResponse),
    )
)]
pub async fn host_meeting(
    State(state): State<AppState>,
    Json(req): Json<HostMeetingRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.title.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "title must not be empty".to_string(),
        ));
    }
    let meeting = state.scheduling_service.host_meeting(req.into()).await?;
    Ok((StatusCode::CREATED, Json(MeetingDto::from(meeting))))
}

/// `GET /meetings` — List meetings with pagination.
#[utoipa::path(
    get,
    path = "/api/v1/meetings",
    tag = "Meetings",
    summary = "List meetings",
    description = "Returns a paginated list of all meetings ordered by start, then title.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated meeting list", body = MeetingListResponse),
    )
)]
pub async fn list_meetings(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let meetings = state.scheduling_service.list_meetings().await;
    let (page, pagination) = params.paginate(meetings);
    Json(MeetingListResponse {
        data: page.into_iter().map(MeetingDto::from).collect(),
        pagination,
    })
}

/// `GET /meetings/:title` — Get a meeting.
///
/// # Errors
///
/// Returns a not-found error if the title is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/meetings/{title}",
    tag = "Meetings",
    summary = "Get a meeting",
    params(("title" = String, Path, description = "Meeting title")),
    responses(
        (status = 200, description = "Meeting", body = MeetingDto),
        (status = 404, description = "Meeting not found", body = ErrorResponse),
    )
)]
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let meeting = state.scheduling_service.get_meeting(&title).await?;
    Ok(Json(MeetingDto::from(meeting)))
}

/// `DELETE /meetings/:title` — Cancel a meeting.
///
/// # Errors
///
/// Returns a not-found error if the title is unknown.
#[utoipa::path(
    delete,
    path = "/api/v1/meetings/{title}",
    tag = "Meetings",
    summary = "Cancel a meeting",
    description = "Removes the meeting for everyone, regardless of remaining participants.",
    params(("title" = String, Path, description = "Meeting title")),
    responses(
        (status = 204, description = "Meeting canceled"),
        (status = 404, description = "Meeting not found", body = ErrorResponse),
    )
)]
pub async fn cancel_meeting(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    state.scheduling_service.cancel_meeting(&title).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /meetings/:title/participants` — Add a participant.
///
/// # Errors
///
/// Returns [`GatewayError`] if the meeting or user is unknown, the user
/// already participates, or the user is busy.
#[utoipa::path(
    post,
    path = "/api/v1/meetings/{title}/participants",
    tag = "Meetings",
    summary = "Add a participant",
    params(("title" = String, Path, description = "Meeting title")),
    request_body = AddParticipantRequest,
    responses(
        (status = 200, description = "Participant added", body = MeetingDto),
        (status = 404, description = "Meeting or user not found", body = ErrorResponse),
        (status = 409, description = "Already participating or time conflict", body = ErrorResponse),
    )
)]
pub async fn add_participant(
    State(state): State<AppState>,
    Path(title): Path<String>,
    Json(req): Json<AddParticipantRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let meeting = state
        .scheduling_service
        .add_participant(&title, &req.username)
        .await?;
    Ok(Json(MeetingDto::from(meeting)))
}

/// `DELETE /meetings/:title/participants/:username` — Remove a participant.
///
/// # Errors
///
/// Returns a not-found error if the meeting is unknown or the user does
/// not participate.
#[utoipa::path(
    delete,
    path = "/api/v1/meetings/{title}/participants/{username}",
    tag = "Meetings",
    summary = "Remove a participant",
    description = "Removes the user from the meeting. The meeting is deleted when its last participant leaves.",
    params(
        ("title" = String, Path, description = "Meeting title"),
        ("username" = String, Path, description = "Participant username"),
    ),
    responses(
        (status = 200, description = "Participant removed", body = ParticipantRemovedResponse),
        (status = 404, description = "Meeting not found or not a participant", body = ErrorResponse),
    )
)]
pub async fn remove_participant(
    State(state): State<AppState>,
    Path((title, username)): Path<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let remaining = state
        .scheduling_service
        .remove_participant(&title, &username)
        .await?;
    Ok(Json(ParticipantRemovedResponse {
        title,
        username,
        pruned: remaining.is_none(),
        meeting: remaining.map(MeetingDto::from),
    }))
}

/// Meeting routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meetings", post(host_meeting).get(list_meetings))
        .route("/meetings/{title}", get(get_meeting).delete(cancel_meeting))
        .route("/meetings/{title}/participants", post(add_participant))
        .route(
            "/meetings/{title}/participants/{username}",
            delete(remove_participant),
        )
}
