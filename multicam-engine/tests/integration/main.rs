
mod lifecycle_tests;
mod source_tests;

use multicam_core::{CandidateInit, PeerId, SlotNumber};
use multicam_engine::{ChannelEvent, EndpointRole, Orchestrator, TransportConfig};
use std::sync::Arc;
use tokio::sync::mpsc;
use utils::{FakeMediaProvider, MockChannel, MockTransportFactory, RecordingSink};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("multicam_engine=debug")
        .with_test_writer()
        .try_init();
}

/// Handles into a running orchestrator: inject rendezvous events, inspect
/// outgoing signals, drive transports, read published statuses.
pub struct Harness {
    pub events: mpsc::Sender<ChannelEvent>,
    pub channel: Arc<MockChannel>,
    pub factory: Arc<MockTransportFactory>,
    pub sink: Arc<RecordingSink>,
}

pub fn spawn_controller(slot_count: u8) -> Harness {
    init_tracing();

    let (events, channel_rx) = mpsc::channel(64);
    let channel = Arc::new(MockChannel::new());
    let factory = Arc::new(MockTransportFactory::new());
    let sink = Arc::new(RecordingSink::new());

    let orchestrator = Orchestrator::new(
        EndpointRole::Controller { slot_count },
        channel.clone(),
        channel_rx,
        factory.clone(),
        sink.clone(),
        TransportConfig::default(),
    );
    tokio::spawn(orchestrator.run());

    Harness {
        events,
        channel,
        factory,
        sink,
    }
}

pub fn spawn_source(slot: SlotNumber, media: Arc<FakeMediaProvider>) -> Harness {
    init_tracing();

    let (events, channel_rx) = mpsc::channel(64);
    let channel = Arc::new(MockChannel::new());
    let factory = Arc::new(MockTransportFactory::new());
    let sink = Arc::new(RecordingSink::new());

    let orchestrator = Orchestrator::new(
        EndpointRole::Source { slot, media },
        channel.clone(),
        channel_rx,
        factory.clone(),
        sink.clone(),
        TransportConfig::default(),
    );
    tokio::spawn(orchestrator.run());

    Harness {
        events,
        channel,
        factory,
        sink,
    }
}

pub fn slot(n: u8) -> SlotNumber {
    SlotNumber::new(n).unwrap()
}

pub fn peer(id: &str) -> PeerId {
    PeerId::from(id)
}

/// Give the event loop a moment to drain already-queued events before a
/// negative assertion.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(80)).await;
}

pub fn candidate(fragment: &str) -> CandidateInit {
    CandidateInit {
        candidate: format!("candidate:{fragment} 1 udp 2130706431 192.0.2.1 54321 typ host"),
        sdp_mid: Some("0".to_owned()),
        sdp_mline_index: Some(0),
    }
}
