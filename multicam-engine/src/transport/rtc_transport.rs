use crate::error::EngineError;
use crate::transport::session_transport::{MediaBinding, SessionTransport, TransportFactory};
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::{TransportEvent, TransportState};
use async_trait::async_trait;
use multicam_core::{CandidateInit, IceServerConfig, PeerId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;

/// Real transport over `webrtc`'s `RTCPeerConnection`.
pub struct RtcTransport {
    pc: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    /// Allocate a peer connection and wire its callbacks into `events`.
    /// The callbacks are `'static`, so peer id and epoch are cloned into
    /// each one.
    pub async fn new(
        peer: PeerId,
        epoch: u64,
        media: MediaBinding,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, EngineError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs().map_err(negotiation)?;
        let registry = register_default_interceptors(Registry::new(), &mut m).map_err(negotiation)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config.ice_servers.iter().map(to_rtc_ice_server).collect(),
            ..Default::default()
        };

        let pc = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(negotiation)?,
        );

        match media {
            MediaBinding::Consume => {
                for kind in [RTPCodecType::Video, RTPCodecType::Audio] {
                    pc.add_transceiver_from_kind(
                        kind,
                        Some(RTCRtpTransceiverInit {
                            direction: RTCRtpTransceiverDirection::Recvonly,
                            send_encodings: vec![],
                        }),
                    )
                    .await
                    .map_err(negotiation)?;
                }
            }
            MediaBinding::Produce(tracks) => {
                for track in tracks {
                    pc.add_track(track).await.map_err(negotiation)?;
                }
            }
        }

        let state_tx = events.clone();
        let uid_state = peer.clone();
        pc.on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            let uid = uid_state.clone();

            Box::pin(async move {
                info!("peer connection state for {uid}: {s:?}");
                let _ = tx
                    .send(TransportEvent::StateChanged {
                        peer: uid,
                        epoch,
                        state: map_state(s),
                    })
                    .await;
            })
        }));

        let ice_tx = events.clone();
        let uid_ice = peer.clone();
        pc.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let uid = uid_ice.clone();

            Box::pin(async move {
                match c {
                    Some(candidate) => {
                        let Ok(init) = candidate.to_json() else { return };
                        let _ = tx
                            .send(TransportEvent::CandidateGenerated {
                                peer: uid,
                                epoch,
                                candidate: CandidateInit {
                                    candidate: init.candidate,
                                    sdp_mid: init.sdp_mid,
                                    sdp_mline_index: init.sdp_mline_index,
                                },
                            })
                            .await;
                    }
                    // A null candidate is the end-of-gathering marker, not
                    // a candidate to forward.
                    None => {
                        let _ = tx
                            .send(TransportEvent::GatheringComplete { peer: uid, epoch })
                            .await;
                    }
                }
            })
        }));

        let track_tx = events;
        let uid_track = peer;
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let uid = uid_track.clone();

            Box::pin(async move {
                debug!("remote {} track arrived from {uid}", track.kind());
                let _ = tx
                    .send(TransportEvent::TrackArrived {
                        peer: uid,
                        epoch,
                        track,
                    })
                    .await;
            })
        }));

        Ok(Self { pc })
    }
}

#[async_trait]
impl SessionTransport for RtcTransport {
    async fn create_offer(&self) -> Result<String, EngineError> {
        let offer = self.pc.create_offer(None).await.map_err(negotiation)?;
        self.pc
            .set_local_description(offer.clone())
            .await
            .map_err(negotiation)?;
        Ok(offer.sdp)
    }

    async fn accept_offer(&self, sdp: String) -> Result<String, EngineError> {
        let desc = RTCSessionDescription::offer(sdp).map_err(negotiation)?;
        self.pc
            .set_remote_description(desc)
            .await
            .map_err(negotiation)?;

        let answer = self.pc.create_answer(None).await.map_err(negotiation)?;
        self.pc
            .set_local_description(answer.clone())
            .await
            .map_err(negotiation)?;
        Ok(answer.sdp)
    }

    async fn accept_answer(&self, sdp: String) -> Result<(), EngineError> {
        let desc = RTCSessionDescription::answer(sdp).map_err(negotiation)?;
        self.pc
            .set_remote_description(desc)
            .await
            .map_err(negotiation)?;
        Ok(())
    }

    async fn add_candidate(&self, candidate: CandidateInit) -> Result<(), EngineError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_mline_index,
            username_fragment: None,
        };
        self.pc
            .add_ice_candidate(init)
            .await
            .map_err(|e| EngineError::Candidate(e.to_string()))
    }

    async fn close(&self) {
        if let Err(e) = self.pc.close().await {
            debug!("peer connection close: {e}");
        }
    }
}

/// Default factory used outside of tests.
#[derive(Default)]
pub struct RtcTransportFactory;

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        peer: PeerId,
        epoch: u64,
        media: MediaBinding,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn SessionTransport>, EngineError> {
        let transport = RtcTransport::new(peer, epoch, media, config, events).await?;
        Ok(Box::new(transport))
    }
}

fn to_rtc_ice_server(config: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: config.urls.clone(),
        username: config.username.clone().unwrap_or_default(),
        credential: config.credential.clone().unwrap_or_default(),
    }
}

fn map_state(state: RTCPeerConnectionState) -> TransportState {
    match state {
        RTCPeerConnectionState::New | RTCPeerConnectionState::Unspecified => TransportState::New,
        RTCPeerConnectionState::Connecting => TransportState::Connecting,
        RTCPeerConnectionState::Connected => TransportState::Connected,
        RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
        RTCPeerConnectionState::Failed => TransportState::Failed,
        RTCPeerConnectionState::Closed => TransportState::Closed,
    }
}

fn negotiation(e: impl std::fmt::Display) -> EngineError {
    EngineError::Negotiation(e.to_string())
}
