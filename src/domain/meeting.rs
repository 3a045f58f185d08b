//! Meeting value type.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::time_range;

/// A titled, time-boxed event with one host and a set of participants.
///
/// Users are referenced by username only. The host is always related to
/// the meeting for conflict purposes, whether or not it is also listed in
/// `participants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meeting {
    /// Unique, immutable title.
    pub title: String,
    /// Username of the user who created the meeting.
    pub host: String,
    /// Usernames of the attendees.
    pub participants: BTreeSet<String>,
    /// Inclusive start instant.
    pub start: DateTime<Utc>,
    /// Exclusive end instant.
    pub end: DateTime<Utc>,
}

impl Meeting {
    /// Creates a meeting. Nothing is validated until it is hosted.
    #[must_use]
    pub fn new<I, S>(
        title: impl Into<String>,
        host: impl Into<String>,
        participants: I,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            host: host.into(),
            participants: participants.into_iter().map(Into::into).collect(),
            start,
            end,
        }
    }

    /// Returns `true` if `end` is strictly after `start`.
    #[must_use]
    pub fn has_valid_range(&self) -> bool {
        self.end > self.start
    }

    /// Returns `true` if `username` is listed as a participant.
    #[must_use]
    pub fn is_participant(&self, username: &str) -> bool {
        self.participants.contains(username)
    }

    /// Returns `true` if `username` is the host.
    #[must_use]
    pub fn is_host(&self, username: &str) -> bool {
        self.host == username
    }

    /// Host followed by every participant, without duplicates.
    pub fn involved(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.host.as_str()).chain(
            self.participants
                .iter()
                .map(String::as_str)
                .filter(move |p| *p != self.host),
        )
    }

    /// Returns `true` if this meeting's range intersects `[start, end)`.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        time_range::overlapped(self.start, self.end, start, end)
    }
}
