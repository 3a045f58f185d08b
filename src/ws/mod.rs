//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` streams schedule events to clients filtered by the
//! usernames they follow, and answers schedule queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
