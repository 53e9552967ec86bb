use crate::model::peer::PeerId;
use crate::model::session::SessionId;
use crate::model::slot::SlotNumber;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    /// Public STUN servers used when no custom configuration is supplied.
    pub fn default_stun() -> Vec<IceServerConfig> {
        vec![IceServerConfig {
            urls: vec![
                "stun:stun.l.google.com:19302".to_owned(),
                "stun:stun1.l.google.com:19302".to_owned(),
                "stun:stun2.l.google.com:19302".to_owned(),
            ],
            username: None,
            credential: None,
        }]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Controller,
    Source,
}

/// One connectivity candidate as carried over the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateInit {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_mline_index: Option<u16>,
}

/// Control messages exchanged through the rendezvous relay.
///
/// The relay rewrites addressing: on outgoing messages `peer` names the
/// recipient, on incoming messages it names the originator. Media never
/// travels this channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum SignalMessage {
    Join {
        session: SessionId,
        role: Role,
        slot: Option<SlotNumber>,
    },
    PeerJoined {
        peer: PeerId,
        slot: SlotNumber,
    },
    PeerLeft {
        peer: PeerId,
        slot: SlotNumber,
    },
    DescriptionOffer {
        peer: PeerId,
        slot: SlotNumber,
        sdp: String,
    },
    DescriptionAnswer {
        peer: PeerId,
        slot: SlotNumber,
        sdp: String,
    },
    Candidate {
        peer: PeerId,
        slot: SlotNumber,
        candidate: CandidateInit,
    },
}
