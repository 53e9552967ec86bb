use crate::channel::{ChannelEvent, RendezvousChannel};
use crate::error::EngineError;
use crate::media::MediaProvider;
use crate::session::peer_session::{NegotiationRole, PeerSession, SignalOutcome};
use crate::session::status_sink::StatusSink;
use crate::transport::{
    MediaBinding, TransportConfig, TransportEvent, TransportFactory,
};
use multicam_core::{AggregateStatus, CandidateInit, PeerId, SlotHealth, SlotNumber, SlotStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Which end of the session this orchestrator instance drives.
#[derive(Clone)]
pub enum EndpointRole {
    /// Views up to `slot_count` sources; always the offerer.
    Controller { slot_count: u8 },
    /// Produces one media stream for `slot`; always the answerer. A peer
    /// session is created lazily on the first offer, so outgoing
    /// candidates are always explicitly addressed to a known controller.
    Source {
        slot: SlotNumber,
        media: Arc<dyn MediaProvider>,
    },
}

/// Single authority mapping rendezvous events to peer-session lifecycle
/// operations. Runs as one event loop; the session map has exactly one
/// writer, so no locking happens inside a session.
pub struct Orchestrator {
    role: EndpointRole,
    sessions: HashMap<PeerId, PeerSession>,
    /// Controller side: which peer currently occupies each slot. At most
    /// one-to-one with live sessions.
    slots: HashMap<SlotNumber, PeerId>,
    /// Last published health per slot; the aggregate is derived from this,
    /// never mutated independently.
    slot_health: HashMap<SlotNumber, SlotHealth>,
    channel: Arc<dyn RendezvousChannel>,
    channel_rx: mpsc::Receiver<ChannelEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    factory: Arc<dyn TransportFactory>,
    sink: Arc<dyn StatusSink>,
    config: TransportConfig,
    next_epoch: u64,
    local_tracks: Option<Vec<crate::media::LocalTrack>>,
    media_failed: bool,
    torn_down: bool,
}

impl Orchestrator {
    pub fn new(
        role: EndpointRole,
        channel: Arc<dyn RendezvousChannel>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        factory: Arc<dyn TransportFactory>,
        sink: Arc<dyn StatusSink>,
        config: TransportConfig,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);

        Self {
            role,
            sessions: HashMap::new(),
            slots: HashMap::new(),
            slot_health: HashMap::new(),
            channel,
            channel_rx,
            transport_tx,
            transport_rx,
            factory,
            sink,
            config,
            next_epoch: 0,
            local_tracks: None,
            media_failed: false,
            torn_down: false,
        }
    }

    pub async fn run(mut self) {
        info!("session orchestrator started");

        if let EndpointRole::Controller { slot_count } = self.role {
            self.sink
                .on_aggregate(AggregateStatus::from_healths(slot_count, []))
                .await;
        }

        loop {
            tokio::select! {
                event = self.channel_rx.recv() => {
                    match event {
                        Some(e) => {
                            if !self.handle_channel_event(e).await {
                                break;
                            }
                        }
                        None => {
                            info!("rendezvous channel dropped, shutting down");
                            break;
                        }
                    }
                }

                event = self.transport_rx.recv() => {
                    match event {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("transport event channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        self.teardown().await;
        info!("session orchestrator finished");
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) -> bool {
        match event {
            ChannelEvent::PeerJoined { peer, slot } => self.handle_peer_joined(peer, slot).await,
            ChannelEvent::PeerLeft { peer, slot } => self.handle_peer_left(peer, slot).await,
            ChannelEvent::Offer { peer, slot, sdp } => self.handle_offer(peer, slot, sdp).await,
            ChannelEvent::Answer { peer, sdp, .. } => self.handle_answer(peer, sdp).await,
            ChannelEvent::Candidate {
                peer, candidate, ..
            } => self.handle_candidate(peer, candidate).await,
            ChannelEvent::Disrupted => {
                // Silence after a disruption means "still negotiating",
                // never failure; the relay's own reconnect policy applies.
                warn!("rendezvous channel disrupted, outgoing signals may be lost");
            }
            ChannelEvent::Reconnected => info!("rendezvous channel reconnected"),
            ChannelEvent::Closed => {
                info!("rendezvous channel closed");
                return false;
            }
        }
        true
    }

    /// Membership notice. Controller side: evict any stale predecessor on
    /// the slot, then open a fresh session as offerer.
    async fn handle_peer_joined(&mut self, peer: PeerId, slot: SlotNumber) {
        let slot_count = match self.role {
            EndpointRole::Controller { slot_count } => slot_count,
            EndpointRole::Source { .. } => {
                info!(%peer, "controller appeared, waiting for its offer");
                return;
            }
        };

        // A slot beyond the configured count would distort the aggregate.
        if slot.get() > slot_count {
            warn!(%peer, %slot, slot_count, "join for out-of-range slot, discarded");
            return;
        }

        info!(%peer, %slot, "source joined");

        if let Some(previous) = self.slots.remove(&slot) {
            info!(%slot, peer = %previous, "slot occupied, tearing down stale predecessor");
            self.close_session(&previous).await;
        }

        match self.connect_to_source(peer.clone(), slot).await {
            Ok(()) => {
                self.slots.insert(slot, peer);
                self.publish_slot(slot, SlotHealth::Waiting, "negotiating with source")
                    .await;
            }
            Err(e) => {
                warn!(%peer, %slot, "failed to start negotiation: {e}");
                self.publish_slot(slot, SlotHealth::Failed, format!("negotiation failed: {e}"))
                    .await;
            }
        }
    }

    async fn connect_to_source(
        &mut self,
        peer: PeerId,
        slot: SlotNumber,
    ) -> Result<(), EngineError> {
        // A relay-assigned peer id is unique per connection, but the map
        // invariant (one session per peer) is enforced regardless.
        if let Some(mut old) = self.sessions.remove(&peer) {
            old.close().await;
        }

        let epoch = self.next_epoch();
        let transport = self
            .factory
            .create(
                peer.clone(),
                epoch,
                MediaBinding::Consume,
                &self.config,
                self.transport_tx.clone(),
            )
            .await?;

        let mut session = PeerSession::new(
            NegotiationRole::Offerer,
            peer.clone(),
            slot,
            epoch,
            transport,
        );

        match session.start_offer().await {
            Ok(sdp) => {
                self.sessions.insert(peer.clone(), session);
                self.channel.send_offer(peer, slot, sdp).await;
                Ok(())
            }
            Err(e) => {
                session.close().await;
                Err(e)
            }
        }
    }

    /// Remote offer. Source side only: the controller is strictly the
    /// offerer, so an inbound offer there is a stale or misrouted signal.
    async fn handle_offer(&mut self, peer: PeerId, slot_hint: SlotNumber, sdp: String) {
        let (my_slot, provider) = match &self.role {
            EndpointRole::Source { slot, media } => (*slot, media.clone()),
            EndpointRole::Controller { .. } => {
                debug!(%peer, "discarding offer: controller never answers");
                return;
            }
        };

        if slot_hint != my_slot {
            debug!(%peer, %slot_hint, %my_slot, "offer slot differs from own, using own");
        }

        if self.media_failed {
            debug!(%peer, "ignoring offer: media acquisition already failed");
            return;
        }

        info!(%peer, %my_slot, "offer received from controller");

        // A renegotiating controller gets a fresh session; negotiation is
        // replaced, never layered.
        if let Some(mut old) = self.sessions.remove(&peer) {
            info!(%peer, "replacing existing session for renegotiation");
            old.close().await;
        }

        let tracks = match &self.local_tracks {
            Some(tracks) => tracks.clone(),
            None => match provider.acquire().await {
                Ok(tracks) => {
                    self.local_tracks = Some(tracks.clone());
                    tracks
                }
                Err(e) => {
                    error!(%my_slot, "media acquisition failed: {e}");
                    self.media_failed = true;
                    self.publish_slot(my_slot, SlotHealth::Failed, e.to_string())
                        .await;
                    return;
                }
            },
        };

        let epoch = self.next_epoch();
        let transport = match self
            .factory
            .create(
                peer.clone(),
                epoch,
                MediaBinding::Produce(tracks),
                &self.config,
                self.transport_tx.clone(),
            )
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                warn!(%peer, "failed to allocate transport: {e}");
                self.publish_slot(my_slot, SlotHealth::Failed, format!("negotiation failed: {e}"))
                    .await;
                return;
            }
        };

        let mut session = PeerSession::new(
            NegotiationRole::Answerer,
            peer.clone(),
            my_slot,
            epoch,
            transport,
        );

        match session.apply_offer(sdp).await {
            Ok(SignalOutcome::Applied(answer)) => {
                self.sessions.insert(peer.clone(), session);
                self.channel.send_answer(peer, my_slot, answer).await;
                self.publish_slot(
                    my_slot,
                    SlotHealth::Waiting,
                    "answer sent, waiting for connectivity",
                )
                .await;
            }
            Ok(SignalOutcome::Stale(state)) => {
                debug!(%peer, ?state, "offer stale on a fresh session, discarded");
            }
            Err(e) => {
                warn!(%peer, "offer rejected: {e}");
                session.close().await;
                self.publish_slot(my_slot, SlotHealth::Failed, format!("negotiation failed: {e}"))
                    .await;
            }
        }
    }

    async fn handle_answer(&mut self, peer: PeerId, sdp: String) {
        let (slot, outcome) = match self.sessions.get_mut(&peer) {
            Some(session) => (session.slot(), session.apply_answer(sdp).await),
            None => {
                debug!(%peer, "answer for unknown peer, discarded");
                return;
            }
        };

        match outcome {
            Ok(SignalOutcome::Applied(())) => {
                debug!(%peer, %slot, "answer applied, buffered candidates flushed");
                self.publish_slot(
                    slot,
                    SlotHealth::Waiting,
                    "negotiation complete, establishing media transport",
                )
                .await;
            }
            Ok(SignalOutcome::Stale(state)) => {
                debug!(%peer, ?state, "stale answer discarded");
            }
            Err(e) => {
                warn!(%peer, %slot, "answer rejected: {e}");
                self.publish_slot(slot, SlotHealth::Failed, format!("negotiation failed: {e}"))
                    .await;
            }
        }
    }

    async fn handle_candidate(&mut self, peer: PeerId, candidate: CandidateInit) {
        let Some(session) = self.sessions.get_mut(&peer) else {
            debug!(%peer, "candidate for unknown peer, discarded");
            return;
        };

        // Rejected candidates are non-fatal; the session keeps waiting for
        // further ones.
        if let Err(e) = session.add_candidate(candidate).await {
            warn!(%peer, "candidate rejected: {e}");
        }
    }

    /// The session's own slot is authoritative for the status update; the
    /// slot carried in the notice is informational only.
    async fn handle_peer_left(&mut self, peer: PeerId, slot: SlotNumber) {
        let Some(owned_slot) = self.close_session(&peer).await else {
            debug!(%peer, %slot, "departure notice for unknown peer, discarded");
            return;
        };
        if owned_slot != slot {
            debug!(%peer, notice_slot = %slot, %owned_slot, "departure slot differs from session");
        }
        info!(%peer, slot = %owned_slot, "remote departed, session torn down");

        self.slots.retain(|_, occupant| occupant != &peer);

        let message = match self.role {
            EndpointRole::Controller { .. } => "source departed, waiting",
            EndpointRole::Source { .. } => "controller departed, waiting",
        };
        self.publish_slot(owned_slot, SlotHealth::Waiting, message).await;
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        let peer = event.peer().clone();
        let (slot, epoch) = match self.sessions.get(&peer) {
            Some(session) => (session.slot(), session.epoch()),
            None => {
                debug!(%peer, "transport event for unknown peer, discarded");
                return;
            }
        };

        // Events from a superseded transport must be no-ops: the session
        // that owned it is gone or replaced.
        if event.epoch() != epoch {
            debug!(%peer, "transport event from superseded connection, discarded");
            return;
        }

        match event {
            TransportEvent::CandidateGenerated { candidate, .. } => {
                if let Some(session) = self.sessions.get_mut(&peer) {
                    session.note_local_candidate();
                }
                self.channel.send_candidate(peer, slot, candidate).await;
            }

            TransportEvent::GatheringComplete { .. } => {
                if let Some(session) = self.sessions.get_mut(&peer) {
                    if session.note_gathering_complete() {
                        let count = session.local_candidates();
                        debug!(%peer, %slot, count, "local candidate gathering complete");
                    }
                }
            }

            TransportEvent::TrackArrived { track, .. } => {
                self.sink.on_remote_track(slot, track).await;
            }

            TransportEvent::StateChanged { state, .. } => {
                let health = self
                    .sessions
                    .get_mut(&peer)
                    .and_then(|s| s.observe_transport(state));
                let Some(health) = health else { return };

                match health {
                    SlotHealth::Connected => {
                        info!(%peer, %slot, "media transport fully connected");
                        self.publish_slot(slot, health, "live").await;
                    }
                    SlotHealth::Disconnected => {
                        // Transient: the transport may still recover.
                        self.publish_slot(slot, health, "connection interrupted, recovering")
                            .await;
                    }
                    SlotHealth::Failed => {
                        warn!(%peer, %slot, "media transport failed, closing session");
                        self.close_session(&peer).await;
                        self.slots.retain(|_, occupant| occupant != &peer);
                        self.publish_slot(slot, health, "connection failed").await;
                    }
                    SlotHealth::Waiting => {
                        self.publish_slot(slot, health, "waiting").await;
                    }
                }
            }
        }
    }

    async fn close_session(&mut self, peer: &PeerId) -> Option<SlotNumber> {
        let mut session = self.sessions.remove(peer)?;
        session.close().await;
        Some(session.slot())
    }

    async fn publish_slot(
        &mut self,
        slot: SlotNumber,
        health: SlotHealth,
        message: impl Into<String>,
    ) {
        self.slot_health.insert(slot, health);
        self.sink
            .on_slot_status(SlotStatus::new(slot, health, message))
            .await;

        if let EndpointRole::Controller { slot_count } = self.role {
            let aggregate =
                AggregateStatus::from_healths(slot_count, self.slot_health.values().copied());
            self.sink.on_aggregate(aggregate).await;
        }
    }

    /// Idempotent: tears down every owned session once.
    async fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        for (peer, mut session) in self.sessions.drain() {
            debug!(%peer, "tearing down session");
            session.close().await;
        }
        self.slots.clear();
    }

    fn next_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }
}
