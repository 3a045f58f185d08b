//! # agenda-gateway
//!
//! REST API and WebSocket gateway for an in-memory meeting registry.
//!
//! Users host meetings and join them as participants; the registry refuses
//! any operation that would put one user in two overlapping meetings. All
//! meetings are indexed by title and by every involved username, and both
//! indexes are kept in step on every mutation.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── SchedulingService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── UserDirectory + MeetingRegistry (domain/)
//!     │
//!     └── JSON-lines snapshots (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
