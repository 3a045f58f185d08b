//! Service layer: business logic orchestration.
//!
//! [`SchedulingService`] guards the user directory and meeting registry
//! behind a single lock, checks that referenced users exist, drives
//! snapshots, and emits events through the [`super::domain::EventBus`].

pub mod scheduling_service;

pub use scheduling_service::{ScheduleState, SchedulingService};
