//! Data Transfer Objects for REST request/response serialization.
//!
//! Timestamps are RFC 3339 strings in UTC.

pub mod common_dto;
pub mod meeting_dto;
pub mod user_dto;

pub use common_dto::*;
pub use meeting_dto::*;
pub use user_dto::*;
