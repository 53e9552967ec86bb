use crate::error::EngineError;
use async_trait::async_trait;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

pub type LocalTrack = Arc<dyn TrackLocal + Send + Sync>;

/// Collaborator that hands out the local capture tracks a source publishes.
///
/// Actual device access (permissions, capture pipelines) lives outside the
/// engine; all the engine needs is the tracks or a [`EngineError::Device`]
/// explaining why there are none. Acquisition failure is fatal to that
/// source's participation and is not retried.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    async fn acquire(&self) -> Result<Vec<LocalTrack>, EngineError>;
}
