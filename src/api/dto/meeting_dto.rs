//! Meeting DTOs for host, get, list and participant operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::Meeting;

/// Request body for `POST /meetings`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HostMeetingRequest {
    /// Unique meeting title.
    pub title: String,
    /// Hosting username.
    pub host: String,
    /// Participant usernames. The host is enrolled if this is empty.
    #[serde(default)]
    pub participants: Vec<String>,
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end; must be after `start`.
    pub end: DateTime<Utc>,
}

impl From<HostMeetingRequest> for Meeting {
    fn from(req: HostMeetingRequest) -> Self {
        Self::new(req.title, req.host, req.participants, req.start, req.end)
    }
}

/// A meeting as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeetingDto {
    /// Meeting title.
    pub title: String,
    /// Hosting username.
    pub host: String,
    /// Participant usernames, sorted.
    pub participants: Vec<String>,
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl From<Meeting> for MeetingDto {
    fn from(meeting: Meeting) -> Self {
        Self {
            title: meeting.title,
            host: meeting.host,
            participants: meeting.participants.into_iter().collect(),
            start: meeting.start,
            end: meeting.end,
        }
    }
}

/// Response body for `GET /meetings`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeetingListResponse {
    /// Meetings on this page, ordered by start then title.
    pub data: Vec<MeetingDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for `GET /users/:username/meetings`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RelatedMeetingsResponse {
    /// User whose schedule this is.
    pub username: String,
    /// Meetings the user hosts or attends, ordered by start then title.
    pub data: Vec<MeetingDto>,
}

/// Request body for `POST /meetings/:title/participants`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddParticipantRequest {
    /// User to enroll.
    pub username: String,
}

/// Response body for `DELETE /meetings/:title/participants/:username`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParticipantRemovedResponse {
    /// Meeting title.
    pub title: String,
    /// Removed username.
    pub username: String,
    /// Whether the meeting was deleted for having no participants left.
    pub pruned: bool,
    /// The meeting as it now stands, absent when pruned.
    pub meeting: Option<MeetingDto>,
}
