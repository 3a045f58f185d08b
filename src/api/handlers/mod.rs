//! REST endpoint handlers organized by resource.

pub mod meeting;
pub mod system;
pub mod user;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().merge(user::routes()).merge(meeting::routes())
}
