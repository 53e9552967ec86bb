use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::*;
use multicam_core::{
    AggregateStatus, Role, SessionId, SlotHealth, SlotNumber, SlotStatus, DEFAULT_SLOT_COUNT,
};
use multicam_engine::{
    EndpointRole, EngineError, LocalTrack, MediaProvider, Orchestrator, RemoteTrack,
    RtcTransportFactory, StatusSink, TransportConfig, WsChannel, WsChannelConfig,
};
use std::sync::Arc;
use webrtc::api::media_engine::MIME_TYPE_VP8;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Parser)]
#[command(name = "multicam")]
#[command(about = "Multi-camera live session over peer-to-peer media transport")]
struct Cli {
    /// Rendezvous relay URL.
    #[arg(long, default_value = "ws://127.0.0.1:9000/ws")]
    relay: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// View every camera slot of a session.
    Controller {
        /// Session to join; generated when omitted.
        #[arg(long)]
        session: Option<String>,

        #[arg(long, default_value_t = DEFAULT_SLOT_COUNT)]
        slots: u8,
    },
    /// Stream one camera slot into a session.
    Source {
        #[arg(long)]
        session: String,

        #[arg(long)]
        slot: u8,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multicam_engine=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Controller { session, slots } => {
            let session = session.map(SessionId::from).unwrap_or_else(SessionId::random);
            println!(
                "{} session {}",
                "🎬 Controller joining".green().bold(),
                session.to_string().cyan()
            );

            let config = WsChannelConfig::new(cli.relay, session, Role::Controller, None);
            let (channel, events) = WsChannel::connect(config)
                .await
                .context("Failed to reach the rendezvous relay")?;

            let orchestrator = Orchestrator::new(
                EndpointRole::Controller { slot_count: slots },
                channel,
                events,
                Arc::new(RtcTransportFactory),
                Arc::new(ConsoleSink),
                TransportConfig::default(),
            );
            orchestrator.run().await;
        }

        Commands::Source { session, slot } => {
            let slot = SlotNumber::new(slot).context("Slot numbers start at 1")?;
            let session = SessionId::from(session);
            println!(
                "{} {} in session {}",
                "📱 Source joining as camera".green().bold(),
                slot.to_string().cyan(),
                session.to_string().cyan()
            );

            let config = WsChannelConfig::new(cli.relay, session, Role::Source, Some(slot));
            let (channel, events) = WsChannel::connect(config)
                .await
                .context("Failed to reach the rendezvous relay")?;

            let orchestrator = Orchestrator::new(
                EndpointRole::Source {
                    slot,
                    media: Arc::new(IdleMediaProvider),
                },
                channel,
                events,
                Arc::new(RtcTransportFactory),
                Arc::new(ConsoleSink),
                TransportConfig::default(),
            );
            orchestrator.run().await;
        }
    }

    Ok(())
}

/// Prints status transitions; a real deployment renders them instead.
struct ConsoleSink;

#[async_trait]
impl StatusSink for ConsoleSink {
    async fn on_slot_status(&self, status: SlotStatus) {
        let label = format!("camera {}", status.slot);
        let line = match status.health {
            SlotHealth::Waiting => format!("⏳ {label}: {}", status.message).yellow(),
            SlotHealth::Connected => format!("✅ {label}: {}", status.message).green(),
            SlotHealth::Disconnected => format!("⚠️  {label}: {}", status.message).yellow(),
            SlotHealth::Failed => format!("❌ {label}: {}", status.message).red(),
        };
        println!("{line}");
    }

    async fn on_aggregate(&self, status: AggregateStatus) {
        println!(
            "{}",
            format!(
                "📊 {}/{} sources connected",
                status.connected, status.total_slots
            )
            .bold()
        );
    }

    async fn on_remote_track(&self, slot: SlotNumber, track: RemoteTrack) {
        println!(
            "{}",
            format!("📹 camera {slot}: remote {} track live", track.kind()).green()
        );
    }
}

/// Negotiates a silent video track. Wiring a real capture pipeline into
/// the sample writer is the integrator's job.
struct IdleMediaProvider;

#[async_trait]
impl MediaProvider for IdleMediaProvider {
    async fn acquire(&self) -> Result<Vec<LocalTrack>, EngineError> {
        let track = TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
            "video".to_owned(),
            "multicam".to_owned(),
        );
        Ok(vec![Arc::new(track)])
    }
}
