//! Ports between the streaming dispatcher and its collaborators.

mod repositories;
mod streamer;
mod tracking;

pub use repositories::{
    AuditEventRepository, AuditEventStreamJob, DestinationRepository, StreamJobScope,
};
pub use streamer::DestinationStreamer;
pub use tracking::{ErrorTracker, InternalEventTracker};
