//! Domain events reflecting directory and registry mutations.
//!
//! Every successful state change emits a [`ScheduleEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Meeting, Withdrawal};

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ScheduleEvent {
    /// A user joined the directory.
    UserRegistered {
        /// New username.
        username: String,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user left the directory after being withdrawn from all meetings.
    UserRemoved {
        /// Removed username.
        username: String,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A meeting was hosted.
    MeetingHosted {
        /// Meeting title.
        title: String,
        /// Hosting user.
        host: String,
        /// Participants at creation time.
        participants: Vec<String>,
        /// Meeting start.
        start: DateTime<Utc>,
        /// Meeting end.
        end: DateTime<Utc>,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A meeting was canceled by or on behalf of its host.
    MeetingCanceled {
        /// Meeting title.
        title: String,
        /// Hosting user.
        host: String,
        /// Participants at cancellation time.
        participants: Vec<String>,
        /// Cancellation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user joined a meeting.
    ParticipantAdded {
        /// Meeting title.
        title: String,
        /// Joining user.
        username: String,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },

    /// A user left a meeting.
    ParticipantRemoved {
        /// Meeting title.
        title: String,
        /// Leaving user.
        username: String,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },

    /// A meeting disappeared because its last participant left.
    MeetingPruned {
        /// Meeting title.
        title: String,
        /// Last user to leave.
        username: String,
        /// Timestamp of the change.
        timestamp: DateTime<Utc>,
    },
}

impl ScheduleEvent {
    /// Cancellation event carrying the meeting's final roster.
    #[must_use]
    pub fn canceled(meeting: Meeting, timestamp: DateTime<Utc>) -> Self {
        Self::MeetingCanceled {
            title: meeting.title,
            host: meeting.host,
            participants: meeting.participants.into_iter().collect(),
            timestamp,
        }
    }

    /// Events for removing `username` from the directory, in the order the
    /// registry applied them: hosted meetings canceled, meetings left,
    /// meetings pruned, then the removal itself. `hosted` holds the
    /// meetings as they stood before cancellation.
    #[must_use]
    pub fn withdrawal(
        username: &str,
        hosted: Vec<Meeting>,
        withdrawal: &Withdrawal,
        timestamp: DateTime<Utc>,
    ) -> Vec<Self> {
        let canceled = hosted.into_iter().map(|m| Self::canceled(m, timestamp));
        let left = withdrawal.left.iter().map(|title| Self::ParticipantRemoved {
            title: title.clone(),
            username: username.to_string(),
            timestamp,
        });
        let pruned = withdrawal.pruned.iter().map(|title| Self::MeetingPruned {
            title: title.clone(),
            username: username.to_string(),
            timestamp,
        });
        canceled
            .chain(left)
            .chain(pruned)
            .chain(std::iter::once(Self::UserRemoved {
                username: username.to_string(),
                timestamp,
            }))
            .collect()
    }

    /// Usernames this event concerns, used for subscription filtering.
    #[must_use]
    pub fn usernames(&self) -> Vec<&str> {
        match self {
            Self::UserRegistered { username, .. }
            | Self::UserRemoved { username, .. }
            | Self::ParticipantAdded { username, .. }
            | Self::ParticipantRemoved { username, .. }
            | Self::MeetingPruned { username, .. } => vec![username.as_str()],
            Self::MeetingHosted {
                host, participants, ..
            }
            | Self::MeetingCanceled {
                host, participants, ..
            } => std::iter::once(host.as_str())
                .chain(participants.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Meeting title, if the event concerns a meeting.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::UserRegistered { .. } | Self::UserRemoved { .. } => None,
            Self::MeetingHosted { title, .. }
            | Self::MeetingCanceled { title, .. }
            | Self::ParticipantAdded { title, .. }
            | Self::ParticipantRemoved { title, .. }
            | Self::MeetingPruned { title, .. } => Some(title.as_str()),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user_registered",
            Self::UserRemoved { .. } => "user_removed",
            Self::MeetingHosted { .. } => "meeting_hosted",
            Self::MeetingCanceled { .. } => "meeting_canceled",
            Self::ParticipantAdded { .. } => "participant_added",
            Self::ParticipantRemoved { .. } => "participant_removed",
            Self::MeetingPruned { .. } => "meeting_pruned",
        }
    }
}
