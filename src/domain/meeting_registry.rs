//! Dual-indexed meeting store with double-booking protection.
//!
//! [`MeetingRegistry`] owns every [`Meeting`]. Meetings live in a primary
//! map keyed by title; a secondary relation map records, for each
//! username, the titles of the meetings that user hosts or attends.
//!
//! # Invariants
//!
//! After every successful operation:
//! - a `(user, title)` pair is in the relation map iff `user` is the host
//!   or a participant of the meeting `title`;
//! - titles are unique;
//! - no user is related to two overlapping meetings (restored snapshots
//!   are trusted and not re-checked);
//! - no meeting in the primary map has an empty participant set.
//!
//! Both maps are only ever touched through `link`, `unlink`, `attach` and
//! `detach`. Every public mutator runs all of its checks before the first
//! write, so a failed call leaves the registry untouched.
//!
//! The registry is a plain synchronous structure. Concurrent callers must
//! wrap it in a lock (see [`crate::service::SchedulingService`]).

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use super::Meeting;
use crate::error::ScheduleError;

/// Result of [`MeetingRegistry::remove_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Withdrawal {
    /// Meetings the user hosted, now canceled.
    pub canceled: Vec<String>,
    /// Meetings the user left that still exist.
    pub left: Vec<String>,
    /// Meetings the user left that were pruned for having no participants.
    pub pruned: Vec<String>,
}

/// Central store for all meetings.
#[derive(Debug, Clone, Default)]
pub struct MeetingRegistry {
    meetings: HashMap<String, Meeting>,
    relation: HashMap<String, BTreeSet<String>>,
}

impl MeetingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the meeting with the given title.
    #[must_use]
    pub fn lookup(&self, title: &str) -> Option<&Meeting> {
        self.meetings.get(title)
    }

    /// Returns `true` if a meeting with the given title exists.
    #[must_use]
    pub fn has(&self, title: &str) -> bool {
        self.meetings.contains_key(title)
    }

    /// Meetings the user hosts or attends, ordered by title. Empty for
    /// unknown users.
    #[must_use]
    pub fn related(&self, username: &str) -> Vec<&Meeting> {
        self.related_iter(username).collect()
    }

    /// All meetings in arbitrary order.
    #[must_use]
    pub fn slice(&self) -> Vec<&Meeting> {
        self.meetings.values().collect()
    }

    /// Iterates over all meetings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Meeting> {
        self.meetings.values()
    }

    /// Number of meetings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meetings.len()
    }

    /// Returns `true` if there are no meetings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty()
    }

    /// Validates and registers a new meeting.
    ///
    /// Checks, in order: the range is non-empty, the title is free, and
    /// neither the host nor any participant is already busy during the
    /// range. A meeting submitted without participants gets its host as
    /// sole participant.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::InvalidTime`] if `end <= start`.
    /// - [`ScheduleError::DuplicateMeeting`] if the title is taken.
    /// - [`ScheduleError::TimeConflict`] naming the first busy user found.
    pub fn host(&mut self, mut meeting: Meeting) -> Result<(), ScheduleError> {
        if !meeting.has_valid_range() {
            return Err(ScheduleError::InvalidTime);
        }
        if self.has(&meeting.title) {
            return Err(ScheduleError::DuplicateMeeting(meeting.title));
        }
        for username in meeting.involved() {
            self.check_free(username, meeting.start, meeting.end, None)?;
        }
        if meeting.participants.is_empty() {
            meeting.participants.insert(meeting.host.clone());
        }
        self.attach(meeting);
        Ok(())
    }

    /// Inserts a meeting without any validation.
    ///
    /// Used by snapshot restore, which trusts its source. A meeting that
    /// reuses an existing title replaces it; one without participants gets
    /// its host as sole participant.
    pub fn restore(&mut self, mut meeting: Meeting) {
        if meeting.participants.is_empty() {
            meeting.participants.insert(meeting.host.clone());
        }
        self.detach(&meeting.title);
        self.attach(meeting);
    }

    /// Removes a meeting outright, regardless of remaining participants.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoSuchMeeting`] if the title is unknown.
    pub fn cancel(&mut self, title: &str) -> Result<Meeting, ScheduleError> {
        self.detach(title)
            .ok_or_else(|| ScheduleError::NoSuchMeeting(title.to_string()))
    }

    /// Cancels every meeting hosted by `username`, returning their titles.
    pub fn cancel_all(&mut self, username: &str) -> Vec<String> {
        let hosted: Vec<String> = self
            .related_iter(username)
            .filter(|m| m.is_host(username))
            .map(|m| m.title.clone())
            .collect();
        for title in &hosted {
            self.detach(title);
        }
        hosted
    }

    /// Adds `username` to the participants of `title`.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::NoSuchMeeting`] if the title is unknown.
    /// - [`ScheduleError::DuplicateUser`] if the user already participates.
    /// - [`ScheduleError::TimeConflict`] if the user is busy in another
    ///   meeting during this one.
    ///
    /// The meeting itself is not counted as a conflict, so a host who left
    /// can rejoin. A literal "any related meeting overlaps" rule would
    /// refuse that, since a host stays related to their own meeting.
    pub fn add(&mut self, title: &str, username: &str) -> Result<(), ScheduleError> {
        let meeting = self
            .meetings
            .get(title)
            .ok_or_else(|| ScheduleError::NoSuchMeeting(title.to_string()))?;
        if meeting.is_participant(username) {
            return Err(ScheduleError::DuplicateUser(username.to_string()));
        }
        self.check_free(username, meeting.start, meeting.end, Some(title))?;

        if let Some(meeting) = self.meetings.get_mut(title) {
            meeting.participants.insert(username.to_string());
        }
        self.link(username, title);
        Ok(())
    }

    /// Removes `username` from the participants of `title`.
    ///
    /// A host that leaves stays related to the meeting while anyone else
    /// remains. When the last participant leaves the meeting is pruned.
    /// Returns `true` if the meeting was pruned.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::NoSuchMeeting`] if the title is unknown.
    /// - [`ScheduleError::NoSuchUser`] if the user is not a participant.
    pub fn remove(&mut self, title: &str, username: &str) -> Result<bool, ScheduleError> {
        let meeting = self
            .meetings
            .get(title)
            .ok_or_else(|| ScheduleError::NoSuchMeeting(title.to_string()))?;
        if !meeting.is_participant(username) {
            return Err(ScheduleError::NoSuchUser(username.to_string()));
        }
        Ok(self.depart(title, username))
    }

    /// Cancels everything `username` hosts, then removes them from every
    /// meeting they still attend.
    pub fn remove_all(&mut self, username: &str) -> Withdrawal {
        let canceled = self.cancel_all(username);

        let attended: Vec<String> = self.related_titles(username).cloned().collect();
        let mut left = Vec::new();
        let mut pruned = Vec::new();
        for title in attended {
            if self.depart(&title, username) {
                pruned.push(title);
            } else {
                left.push(title);
            }
        }

        Withdrawal {
            canceled,
            left,
            pruned,
        }
    }

    /// Finds the first meeting related to `username` that overlaps
    /// `[start, end)`, ignoring `skip`.
    fn check_free(
        &self,
        username: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        skip: Option<&str>,
    ) -> Result<(), ScheduleError> {
        let conflict = self
            .related_iter(username)
            .filter(|m| Some(m.title.as_str()) != skip)
            .find(|m| m.overlaps(start, end));
        match conflict {
            Some(existing) => {
                tracing::debug!(
                    username,
                    title = %existing.title,
                    start = %existing.start,
                    end = %existing.end,
                    "time conflict"
                );
                Err(ScheduleError::TimeConflict {
                    username: username.to_string(),
                    title: existing.title.clone(),
                    start: existing.start,
                    end: existing.end,
                })
            }
            None => Ok(()),
        }
    }

    /// Drops `username` from the participants of `title`. Returns `true` if
    /// that emptied and pruned the meeting.
    fn depart(&mut self, title: &str, username: &str) -> bool {
        let Some(meeting) = self.meetings.get_mut(title) else {
            self.unlink(username, title);
            return false;
        };
        meeting.participants.remove(username);
        if meeting.participants.is_empty() {
            // `detach` only sees who is still involved.
            self.unlink(username, title);
            self.detach(title);
            return true;
        }
        if !meeting.is_host(username) {
            self.unlink(username, title);
        }
        false
    }

    fn related_titles(&self, username: &str) -> impl Iterator<Item = &String> {
        self.relation.get(username).into_iter().flatten()
    }

    fn related_iter(&self, username: &str) -> impl Iterator<Item = &Meeting> {
        self.related_titles(username)
            .filter_map(move |title| self.meetings.get(title))
    }

    fn attach(&mut self, meeting: Meeting) {
        let title = meeting.title.clone();
        let involved: Vec<String> = meeting.involved().map(str::to_string).collect();
        self.meetings.insert(title.clone(), meeting);
        for username in &involved {
            self.link(username, &title);
        }
    }

    fn detach(&mut self, title: &str) -> Option<Meeting> {
        let meeting = self.meetings.remove(title)?;
        for username in meeting.involved() {
            self.unlink(username, title);
        }
        Some(meeting)
    }

    fn link(&mut self, username: &str, title: &str) {
        self.relation
            .entry(username.to_string())
            .or_default()
            .insert(title.to_string());
    }

    fn unlink(&mut self, username: &str, title: &str) {
        if let Some(bucket) = self.relation.get_mut(username) {
            bucket.remove(title);
            if bucket.is_empty() {
                self.relation.remove(username);
            }
        }
    }
}
