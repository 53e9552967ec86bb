use crate::channel::rendezvous::{ChannelEvent, RendezvousChannel};
use crate::error::EngineError;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use multicam_core::{CandidateInit, PeerId, Role, SessionId, SignalMessage, SlotNumber};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct WsChannelConfig {
    pub url: String,
    pub session: SessionId,
    pub role: Role,
    /// Required for sources, absent for the controller.
    pub slot: Option<SlotNumber>,
    pub max_reconnects: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl WsChannelConfig {
    pub fn new(url: impl Into<String>, session: SessionId, role: Role, slot: Option<SlotNumber>) -> Self {
        Self {
            url: url.into(),
            session,
            role,
            slot,
            max_reconnects: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// JSON-over-WebSocket rendezvous adapter.
///
/// Announces presence with a `join` on every (re)connect and converts
/// inbound frames into [`ChannelEvent`]s. Reconnects are bounded with
/// capped backoff; signals queued while the link is down are dropped, not
/// replayed.
pub struct WsChannel {
    out_tx: mpsc::UnboundedSender<SignalMessage>,
}

impl WsChannel {
    pub async fn connect(
        config: WsChannelConfig,
    ) -> Result<(Arc<Self>, mpsc::Receiver<ChannelEvent>), EngineError> {
        let (socket, _) = connect_async(config.url.as_str())
            .await
            .map_err(|e| EngineError::Channel(format!("connect to {}: {e}", config.url)))?;
        info!("connected to rendezvous relay at {}", config.url);

        let (event_tx, event_rx) = mpsc::channel(256);
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_link(socket, config, out_rx, event_tx));

        Ok((Arc::new(Self { out_tx }), event_rx))
    }

    fn send(&self, msg: SignalMessage) {
        if self.out_tx.send(msg).is_err() {
            warn!("rendezvous link task is gone, dropping outgoing signal");
        }
    }
}

#[async_trait]
impl RendezvousChannel for WsChannel {
    async fn send_offer(&self, peer: PeerId, slot: SlotNumber, sdp: String) {
        self.send(SignalMessage::DescriptionOffer { peer, slot, sdp });
    }

    async fn send_answer(&self, peer: PeerId, slot: SlotNumber, sdp: String) {
        self.send(SignalMessage::DescriptionAnswer { peer, slot, sdp });
    }

    async fn send_candidate(&self, peer: PeerId, slot: SlotNumber, candidate: CandidateInit) {
        self.send(SignalMessage::Candidate {
            peer,
            slot,
            candidate,
        });
    }
}

async fn run_link(
    mut socket: WsStream,
    config: WsChannelConfig,
    mut out_rx: mpsc::UnboundedReceiver<SignalMessage>,
    event_tx: mpsc::Sender<ChannelEvent>,
) {
    loop {
        let (mut sink, mut stream) = socket.split();

        let join = SignalMessage::Join {
            session: config.session.clone(),
            role: config.role,
            slot: config.slot,
        };
        match serde_json::to_string(&join) {
            Ok(json) => {
                if let Err(e) = sink.send(Message::Text(json)).await {
                    warn!("failed to announce presence: {e}");
                }
            }
            Err(e) => error!("failed to serialize join: {e}"),
        }

        let disrupted = loop {
            tokio::select! {
                out = out_rx.recv() => match out {
                    Some(msg) => {
                        let json = match serde_json::to_string(&msg) {
                            Ok(json) => json,
                            Err(e) => {
                                error!("failed to serialize signal message: {e}");
                                continue;
                            }
                        };
                        if let Err(e) = sink.send(Message::Text(json)).await {
                            warn!("relay send failed: {e}");
                            break true;
                        }
                    }
                    // All channel handles dropped: orderly shutdown.
                    None => break false,
                },

                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<SignalMessage>(&text) {
                            Ok(signal) => {
                                let Some(event) = inbound_event(signal) else { continue };
                                if event_tx.send(event).await.is_err() {
                                    break false;
                                }
                            }
                            Err(e) => warn!("invalid signal message from relay: {e}"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("relay read failed: {e}");
                        break true;
                    }
                },
            }
        };

        if !disrupted {
            let _ = event_tx.send(ChannelEvent::Closed).await;
            return;
        }

        warn!("rendezvous relay disconnected");
        let _ = event_tx.send(ChannelEvent::Disrupted).await;

        match reconnect(&config, &mut out_rx).await {
            Some(ws) => {
                info!("rendezvous relay reconnected");
                socket = ws;
                let _ = event_tx.send(ChannelEvent::Reconnected).await;
            }
            None => {
                error!("rendezvous reconnect attempts exhausted");
                let _ = event_tx.send(ChannelEvent::Closed).await;
                return;
            }
        }
    }
}

/// Bounded retry with capped backoff. Signals queued while the link is
/// down are discarded: delivery across a relay reconnect is not guaranteed
/// and the negotiation state machine tolerates the gap.
async fn reconnect(
    config: &WsChannelConfig,
    out_rx: &mut mpsc::UnboundedReceiver<SignalMessage>,
) -> Option<WsStream> {
    let mut backoff = config.initial_backoff;

    for attempt in 1..=config.max_reconnects {
        tokio::time::sleep(backoff).await;

        while let Ok(dropped) = out_rx.try_recv() {
            debug!(?dropped, "dropping signal queued during relay disruption");
        }

        match connect_async(config.url.as_str()).await {
            Ok((ws, _)) => return Some(ws),
            Err(e) => {
                warn!(attempt, "relay reconnect failed: {e}");
                backoff = (backoff * 2).min(config.max_backoff);
            }
        }
    }
    None
}

fn inbound_event(signal: SignalMessage) -> Option<ChannelEvent> {
    match signal {
        SignalMessage::PeerJoined { peer, slot } => Some(ChannelEvent::PeerJoined { peer, slot }),
        SignalMessage::PeerLeft { peer, slot } => Some(ChannelEvent::PeerLeft { peer, slot }),
        SignalMessage::DescriptionOffer { peer, slot, sdp } => {
            Some(ChannelEvent::Offer { peer, slot, sdp })
        }
        SignalMessage::DescriptionAnswer { peer, slot, sdp } => {
            Some(ChannelEvent::Answer { peer, slot, sdp })
        }
        SignalMessage::Candidate {
            peer,
            slot,
            candidate,
        } => Some(ChannelEvent::Candidate {
            peer,
            slot,
            candidate,
        }),
        SignalMessage::Join { .. } => {
            warn!("unexpected join echoed by relay, ignoring");
            None
        }
    }
}
