//! Persistence layer: snapshot codec and file-backed snapshot store.
//!
//! Snapshots are best-effort dumps of the user directory and meeting
//! registry. They are not a transactional log: a crash between two
//! snapshots loses whatever changed in between.

pub mod snapshot;
pub mod store;

pub use snapshot::{EncodedSnapshot, MeetingRecord};
pub use store::SnapshotStore;
