//! Scheduling service: orchestrates directory and registry operations and
//! emits events.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    EventBus, Meeting, MeetingRegistry, ScheduleEvent, User, UserDirectory, Withdrawal,
};
use crate::error::{GatewayError, ScheduleError};
use crate::persistence::{EncodedSnapshot, SnapshotStore};

/// Users and meetings, always locked together.
#[derive(Debug, Clone, Default)]
pub struct ScheduleState {
    /// Registered users.
    pub users: UserDirectory,
    /// All meetings.
    pub meetings: MeetingRegistry,
}

impl ScheduleState {
    fn ensure_registered(&self, username: &str) -> Result<(), GatewayError> {
        if self.users.contains(username) {
            Ok(())
        } else {
            Err(GatewayError::UserNotFound(username.to_string()))
        }
    }
}

/// Orchestration layer for all scheduling operations.
///
/// Owns the shared [`ScheduleState`] behind one `RwLock`: every mutation
/// holds the write guard from its first check to its last write, so
/// check-then-act sequences are atomic with respect to other writers.
/// Reads share the lock. Events are published after the guard is released.
#[derive(Debug, Clone)]
pub struct SchedulingService {
    state: Arc<RwLock<ScheduleState>>,
    event_bus: EventBus,
    store: Option<SnapshotStore>,
}

impl SchedulingService {
    /// Creates a new `SchedulingService` over the given state.
    #[must_use]
    pub fn new(state: ScheduleState, event_bus: EventBus, store: Option<SnapshotStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            event_bus,
            store,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a blank username and
    /// [`GatewayError::UserExists`] if the username is taken.
    pub async fn register_user(&self, user: User) -> Result<User, GatewayError> {
        if user.username.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "username must not be empty".to_string(),
            ));
        }
        let mut state = self.state.write().await;
        if !state.users.add(user.clone()) {
            return Err(GatewayError::UserExists(user.username));
        }
        drop(state);

        let _ = self.event_bus.publish(ScheduleEvent::UserRegistered {
            username: user.username.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(username = %user.username, "user registered");
        Ok(user)
    }

    /// Returns a registered user.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] if the username is unknown.
    pub async fn get_user(&self, username: &str) -> Result<User, GatewayError> {
        let state = self.state.read().await;
        state
            .users
            .lookup(username)
            .cloned()
            .ok_or_else(|| GatewayError::UserNotFound(username.to_string()))
    }

    /// Returns all users ordered by username.
    pub async fn list_users(&self) -> Vec<User> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.iter().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    /// Withdraws a user from every meeting, canceling the ones they host,
    /// then unregisters them.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] if the username is unknown.
    pub async fn remove_user(&self, username: &str) -> Result<Withdrawal, GatewayError> {
        let mut state = self.state.write().await;
        state.ensure_registered(username)?;
        let hosted = hosted_by(&state.meetings, username);
        let withdrawal = state.meetings.remove_all(username);
        state.users.remove(username);
        drop(state);

        self.event_bus.publish_all(ScheduleEvent::withdrawal(
            username,
            hosted,
            &withdrawal,
            Utc::now(),
        ));

        tracing::info!(
            username,
            canceled = withdrawal.canceled.len(),
            left = withdrawal.left.len() + withdrawal.pruned.len(),
            "user removed"
        );
        Ok(withdrawal)
    }

    /// Hosts a new meeting after checking every referenced user exists.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unregistered host or
    /// participant, or the registry's [`ScheduleError`].
    pub async fn host_meeting(&self, meeting: Meeting) -> Result<Meeting, GatewayError> {
        let mut state = self.state.write().await;
        for username in meeting.involved() {
            state.ensure_registered(username)?;
        }
        let title = meeting.title.clone();
        if let Err(err) = state.meetings.host(meeting) {
            tracing::info!(%title, error = %err, "meeting rejected");
            return Err(err.into());
        }
        let hosted = stored(&state.meetings, &title)?;
        drop(state);

        let _ = self.event_bus.publish(ScheduleEvent::MeetingHosted {
            title: hosted.title.clone(),
            host: hosted.host.clone(),
            participants: hosted.participants.iter().cloned().collect(),
            start: hosted.start,
            end: hosted.end,
            timestamp: Utc::now(),
        });
        tracing::info!(%title, host = %hosted.host, "meeting hosted");
        Ok(hosted)
    }

    /// Cancels a meeting regardless of who still attends.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoSuchMeeting`] if the title is unknown.
    pub async fn cancel_meeting(&self, title: &str) -> Result<Meeting, GatewayError> {
        let mut state = self.state.write().await;
        let meeting = state.meetings.cancel(title)?;
        drop(state);

        let _ = self.event_bus.publish(ScheduleEvent::canceled(meeting.clone(), Utc::now()));
        tracing::info!(title, "meeting canceled");
        Ok(meeting)
    }

    /// Cancels every meeting the user hosts, returning their titles.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] if the username is unknown.
    pub async fn cancel_hosted(&self, username: &str) -> Result<Vec<String>, GatewayError> {
        let mut state = self.state.write().await;
        state.ensure_registered(username)?;
        let hosted = hosted_by(&state.meetings, username);
        let canceled = state.meetings.cancel_all(username);
        drop(state);

        let now = Utc::now();
        self.event_bus
            .publish_all(hosted.into_iter().map(|m| ScheduleEvent::canceled(m, now)));
        tracing::info!(username, count = canceled.len(), "hosted meetings canceled");
        Ok(canceled)
    }

    /// Adds a registered user to a meeting.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unregistered user, or
    /// the registry's [`ScheduleError`].
    pub async fn add_participant(
        &self,
        title: &str,
        username: &str,
    ) -> Result<Meeting, GatewayError> {
        let mut state = self.state.write().await;
        state.ensure_registered(username)?;
        state.meetings.add(title, username)?;
        let meeting = stored(&state.meetings, title)?;
        drop(state);

        let _ = self.event_bus.publish(ScheduleEvent::ParticipantAdded {
            title: title.to_string(),
            username: username.to_string(),
            timestamp: Utc::now(),
        });
        tracing::info!(title, username, "participant added");
        Ok(meeting)
    }

    /// Removes a participant from a meeting. Returns the meeting as it now
    /// stands, or `None` if that pruned it.
    ///
    /// # Errors
    ///
    /// Returns the registry's [`ScheduleError`].
    pub async fn remove_participant(
        &self,
        title: &str,
        username: &str,
    ) -> Result<Option<Meeting>, GatewayError> {
        let mut state = self.state.write().await;
        let pruned = state.meetings.remove(title, username)?;
        let remaining = state.meetings.lookup(title).cloned();
        drop(state);

        let timestamp = Utc::now();
        let event = if pruned {
            ScheduleEvent::MeetingPruned {
                title: title.to_string(),
                username: username.to_string(),
                timestamp,
            }
        } else {
            ScheduleEvent::ParticipantRemoved {
                title: title.to_string(),
                username: username.to_string(),
                timestamp,
            }
        };
        let _ = self.event_bus.publish(event);
        tracing::info!(title, username, pruned, "participant removed");
        Ok(remaining)
    }

    /// Returns a meeting by title.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoSuchMeeting`] if the title is unknown.
    pub async fn get_meeting(&self, title: &str) -> Result<Meeting, GatewayError> {
        let state = self.state.read().await;
        stored(&state.meetings, title)
    }

    /// Returns all meetings ordered by start, then title.
    pub async fn list_meetings(&self) -> Vec<Meeting> {
        let state = self.state.read().await;
        chronological(state.meetings.iter())
    }

    /// Returns the meetings a registered user hosts or attends, ordered by
    /// start, then title.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] if the username is unknown.
    pub async fn related_meetings(&self, username: &str) -> Result<Vec<Meeting>, GatewayError> {
        let state = self.state.read().await;
        state.ensure_registered(username)?;
        Ok(chronological(state.meetings.related(username).into_iter()))
    }

    /// Writes the current state to the snapshot store. Returns the number
    /// of users and meetings written, or `None` if persistence is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] if encoding or writing fails.
    pub async fn save_snapshot(&self) -> Result<Option<(usize, usize)>, GatewayError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let state = self.state.read().await;
        let encoded = EncodedSnapshot::encode(&state.users, &state.meetings)?;
        drop(state);

        store.save(&encoded).await?;
        tracing::info!(
            users = encoded.user_count,
            meetings = encoded.meeting_count,
            "snapshot saved"
        );
        Ok(Some((encoded.user_count, encoded.meeting_count)))
    }

    /// Replaces the current state with the stored snapshot. Returns the
    /// number of users and meetings restored, or `None` if persistence is
    /// disabled. On error the current state is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] if the snapshot cannot be read.
    pub async fn restore_snapshot(&self) -> Result<Option<(usize, usize)>, GatewayError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let (users, meetings) = store.load().await?;
        let counts = (users.len(), meetings.len());

        let mut state = self.state.write().await;
        *state = ScheduleState { users, meetings };
        drop(state);

        tracing::info!(users = counts.0, meetings = counts.1, "snapshot restored");
        Ok(Some(counts))
    }
}

fn stored(meetings: &MeetingRegistry, title: &str) -> Result<Meeting, GatewayError> {
    meetings
        .lookup(title)
        .cloned()
        .ok_or_else(|| ScheduleError::NoSuchMeeting(title.to_string()).into())
}

fn hosted_by(meetings: &MeetingRegistry, username: &str) -> Vec<Meeting> {
    meetings
        .related(username)
        .into_iter()
        .filter(|m| m.is_host(username))
        .cloned()
        .collect()
}

fn chronological<'a>(meetings: impl Iterator<Item = &'a Meeting>) -> Vec<Meeting> {
    let mut sorted: Vec<Meeting> = meetings.cloned().collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
    sorted
}
