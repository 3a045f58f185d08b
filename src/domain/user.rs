//! Registered users and the directory that resolves usernames.
//!
//! The meeting registry only ever stores usernames. [`UserDirectory`] is
//! the collaborator that says whether a username refers to a real user.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A registered user. `username` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique login name.
    pub username: String,
    /// Contact e-mail address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl User {
    /// Creates a user with no contact details.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            phone: None,
        }
    }
}

/// Set of users keyed by username.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the user with the given username.
    #[must_use]
    pub fn lookup(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    /// Returns `true` if the username is registered.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Adds a user. Returns `false` and leaves the directory untouched if
    /// the username is already taken.
    pub fn add(&mut self, user: User) -> bool {
        if self.users.contains_key(&user.username) {
            return false;
        }
        self.users.insert(user.username.clone(), user);
        true
    }

    /// Removes and returns the user with the given username.
    pub fn remove(&mut self, username: &str) -> Option<User> {
        self.users.remove(username)
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no users are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterates over all users in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }
}

impl FromIterator<User> for UserDirectory {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        let mut directory = Self::new();
        for user in iter {
            directory.add(user);
        }
        directory
    }
}
