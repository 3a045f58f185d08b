//! OpenAPI description of the REST surface.

use utoipa::OpenApi;

use super::dto;
use super::handlers::{meeting, system, user};
use crate::error::{ErrorBody, ErrorResponse};

/// Aggregated OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "agenda-gateway",
        description = "Meeting registry with double-booking protection"
    ),
    paths(
        user::register_user,
        user::list_users,
        user::get_user,
        user::remove_user,
        user::related_meetings,
        user::cancel_hosted,
        meeting::host_meeting,
        meeting::list_meetings,
        meeting::get_meeting,
        meeting::cancel_meeting,
        meeting::add_participant,
        meeting::remove_participant,
        system::health_handler,
        system::snapshot_handler,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        dto::RegisterUserRequest,
        dto::UserDto,
        dto::UserListResponse,
        dto::UserRemovedResponse,
        dto::HostedCanceledResponse,
        dto::HostMeetingRequest,
        dto::MeetingDto,
        dto::MeetingListResponse,
        dto::RelatedMeetingsResponse,
        dto::AddParticipantRequest,
        dto::ParticipantRemovedResponse,
        dto::PaginationMeta,
        system::HealthResponse,
        system::SnapshotResponse,
    )),
    tags(
        (name = "Users", description = "User directory"),
        (name = "Meetings", description = "Meeting registry"),
        (name = "System", description = "Health and administration"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/users",
            "/api/v1/users/{username}",
            "/api/v1/users/{username}/meetings",
            "/api/v1/users/{username}/hosted-meetings",
            "/api/v1/meetings",
            "/api/v1/meetings/{title}",
            "/api/v1/meetings/{title}/participants",
            "/api/v1/meetings/{title}/participants/{username}",
            "/health",
            "/admin/snapshot",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
