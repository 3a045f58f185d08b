//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::SchedulingService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Scheduling service for all business logic.
    pub scheduling_service: Arc<SchedulingService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wraps `service`, sharing its event bus with the WebSocket layer.
    #[must_use]
    pub fn new(service: SchedulingService) -> Self {
        let event_bus = service.event_bus().clone();
        Self {
            scheduling_service: Arc::new(service),
            event_bus,
        }
    }
}
