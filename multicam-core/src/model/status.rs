use crate::model::slot::SlotNumber;
use serde::{Deserialize, Serialize};

/// Connection health of one slot, as the presentation layer sees it.
///
/// `Connected` means the media transport itself reports full connectivity,
/// not merely that negotiation finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotHealth {
    Waiting,
    Connected,
    Disconnected,
    Failed,
}

/// Per-slot status pushed to the presentation layer on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStatus {
    pub slot: SlotNumber,
    pub health: SlotHealth,
    pub message: String,
}

impl SlotStatus {
    pub fn new(slot: SlotNumber, health: SlotHealth, message: impl Into<String>) -> Self {
        Self {
            slot,
            health,
            message: message.into(),
        }
    }
}

/// Controller-side projection: source count by health. Derived, never
/// independently mutated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStatus {
    pub total_slots: u8,
    pub connected: u8,
    pub waiting: u8,
    pub disconnected: u8,
    pub failed: u8,
}

impl AggregateStatus {
    /// Recompute from the current per-slot healths. Slots with no source
    /// at all count as waiting.
    pub fn from_healths<I>(total_slots: u8, healths: I) -> Self
    where
        I: IntoIterator<Item = SlotHealth>,
    {
        let mut agg = AggregateStatus {
            total_slots,
            waiting: total_slots,
            ..Default::default()
        };
        for health in healths {
            match health {
                SlotHealth::Waiting => {}
                SlotHealth::Connected => {
                    agg.connected += 1;
                    agg.waiting = agg.waiting.saturating_sub(1);
                }
                SlotHealth::Disconnected => {
                    agg.disconnected += 1;
                    agg.waiting = agg.waiting.saturating_sub(1);
                }
                SlotHealth::Failed => {
                    agg.failed += 1;
                    agg.waiting = agg.waiting.saturating_sub(1);
                }
            }
        }
        agg
    }
}
