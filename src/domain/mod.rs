//! Domain layer: scheduling types, the meeting registry, and events.
//!
//! This module contains the core model: users and their directory, the
//! meeting value type, the dual-indexed [`MeetingRegistry`] that enforces
//! the no-double-booking rule, the time-range helpers it relies on, and
//! the event bus that broadcasts every successful mutation.

pub mod event_bus;
pub mod meeting;
pub mod meeting_registry;
pub mod schedule_event;
pub mod time_range;
pub mod user;

pub use event_bus::EventBus;
pub use meeting::Meeting;
pub use meeting_registry::{MeetingRegistry, Withdrawal};
pub use schedule_event::ScheduleEvent;
pub use user::{User, UserDirectory};
