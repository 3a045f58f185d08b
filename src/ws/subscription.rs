//! Per-connection subscription manager.
//!
//! Tracks which usernames a WebSocket client follows and filters events
//! server-side.

use std::collections::HashSet;

use crate::domain::ScheduleEvent;

/// Usernames a single WebSocket connection is subscribed to.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Ignored while `subscribe_all` is set.
    usernames: HashSet<String>,
    /// Wildcard `"*"`.
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follows `usernames`; `"*"` enables the wildcard. Returns the names
    /// that were newly added.
    pub fn subscribe<'a>(&mut self, usernames: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut added = Vec::new();
        for name in usernames {
            if name == "*" {
                self.subscribe_all = true;
            } else if self.usernames.insert(name.to_string()) {
                added.push(name.to_string());
            }
        }
        added
    }

    /// Stops following `usernames`; `"*"` clears the wildcard.
    pub fn unsubscribe<'a>(&mut self, usernames: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut removed = Vec::new();
        for name in usernames {
            if name == "*" {
                self.subscribe_all = false;
            } else if self.usernames.remove(name) {
                removed.push(name.to_string());
            }
        }
        removed
    }

    /// Returns `true` if any user touched by `event` is followed.
    #[must_use]
    pub fn matches(&self, event: &ScheduleEvent) -> bool {
        self.subscribe_all
            || event
                .usernames()
                .into_iter()
                .any(|name| self.usernames.contains(name))
    }

    /// Number of explicitly followed usernames.
    #[must_use]
    pub fn count(&self) -> usize {
        self.usernames.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn added(title: &str, username: &str) -> ScheduleEvent {
        ScheduleEvent::ParticipantAdded {
            title: title.to_string(),
            username: username.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn canceled(host: &str, participants: &[&str]) -> ScheduleEvent {
        ScheduleEvent::MeetingCanceled {
            title: "standup".to_string(),
            host: host.to_string(),
            participants: participants.iter().map(ToString::to_string).collect(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(&added("standup", "alice")));
    }

    #[test]
    fn follows_named_users() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.subscribe(["alice", "alice"]), vec!["alice".to_string()]);
        assert!(mgr.matches(&added("standup", "alice")));
        assert!(!mgr.matches(&added("standup", "bob")));
    }

    #[test]
    fn meeting_events_match_any_involved_user() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(["carol"]);
        assert!(mgr.matches(&canceled("alice", &["bob", "carol"])));
        assert!(!mgr.matches(&canceled("alice", &["bob"])));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        assert!(mgr.subscribe(["*"]).is_empty());
        assert!(mgr.is_subscribed_all());
        assert!(mgr.matches(&added("standup", "anyone")));

        mgr.unsubscribe(["*"]);
        assert!(!mgr.matches(&added("standup", "anyone")));
    }

    #[test]
    fn unsubscribe_reports_removed() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(["alice", "bob"]);
        assert_eq!(mgr.count(), 2);
        assert_eq!(mgr.unsubscribe(["bob", "dave"]), vec!["bob".to_string()]);
        assert_eq!(mgr.count(), 1);
    }
}
