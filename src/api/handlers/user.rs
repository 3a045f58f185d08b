//! User directory handlers: register, list, get, remove, schedule.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{
    HostedCanceledResponse, MeetingDto, RegisterUserRequest, RelatedMeetingsResponse, UserDto,
    UserListResponse, UserRemovedResponse,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /users` — Register a user.
///
/// # Errors
///
/// Returns [`GatewayError`] for a blank or taken username.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    summary = "Register a user",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserDto),
        (status = 400, description = "Blank username", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state.scheduling_service.register_user(req.into()).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// `GET /users` — List registered users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    summary = "List users",
    responses(
        (status = 200, description = "All users", body = UserListResponse),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    let users = state.scheduling_service.list_users().await;
    let total = users.len();
    Json(UserListResponse {
        data: users.into_iter().map(UserDto::from).collect(),
        total,
    })
}

/// `GET /users/:username` — Get a user.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] if the username is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    tag = "Users",
    summary = "Get a user",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User", body = UserDto),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state.scheduling_service.get_user(&username).await?;
    Ok(Json(UserDto::from(user)))
}

/// `DELETE /users/:username` — Withdraw a user from everything and
/// unregister them.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] if the username is unknown.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    tag = "Users",
    summary = "Remove a user",
    description = "Cancels every meeting the user hosts, removes them from every meeting they attend, then unregisters them.",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User removed", body = UserRemovedResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn remove_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let withdrawal = state.scheduling_service.remove_user(&username).await?;
    Ok(Json(UserRemovedResponse::new(username, withdrawal)))
}

/// `GET /users/:username/meetings` — Meetings the user hosts or attends.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] if the username is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}/meetings",
    tag = "Users",
    summary = "User schedule",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Related meetings", body = RelatedMeetingsResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn related_meetings(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let meetings = state.scheduling_service.related_meetings(&username).await?;
    Ok(Json(RelatedMeetingsResponse {
        username,
        data: meetings.into_iter().map(MeetingDto::from).collect(),
    }))
}

/// `DELETE /users/:username/hosted-meetings` — Cancel everything the user
/// hosts.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] if the username is unknown.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}/hosted-meetings",
    tag = "Users",
    summary = "Cancel hosted meetings",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Meetings canceled", body = HostedCanceledResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn cancel_hosted(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let canceled = state.scheduling_service.cancel_hosted(&username).await?;
    Ok(Json(HostedCanceledResponse { username, canceled }))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user).get(list_users))
        .route("/users/{username}", get(get_user).delete(remove_user))
        .route("/users/{username}/meetings", get(related_meetings))
        .route("/users/{username}/hosted-meetings", delete(cancel_hosted))
}
