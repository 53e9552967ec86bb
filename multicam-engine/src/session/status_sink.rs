use crate::transport::RemoteTrack;
use async_trait::async_trait;
use multicam_core::{AggregateStatus, SlotNumber, SlotStatus};

/// Presentation-layer contract. The orchestrator pushes on every change;
/// the sink is never polled.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Per-slot health plus a human-readable message.
    async fn on_slot_status(&self, status: SlotStatus);

    /// Controller-side projection, recomputed on every health transition.
    async fn on_aggregate(&self, status: AggregateStatus);

    /// A live remote stream became available for a slot.
    async fn on_remote_track(&self, slot: SlotNumber, track: RemoteTrack);
}
