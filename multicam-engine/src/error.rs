use thiserror::Error;

/// Failure taxonomy of the negotiation engine.
///
/// Stale signals (messages for a superseded or unknown peer) are not
/// errors; they surface as [`crate::session::SignalOutcome::Stale`] or are
/// dropped with a debug log by the orchestrator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Local media unavailable or denied. Fatal to that source's
    /// participation; never retried automatically.
    #[error("media device unavailable: {0}")]
    Device(String),

    /// Session description creation or application failed. The affected
    /// peer session moves to `Failed`.
    #[error("negotiation failed: {0}")]
    Negotiation(String),

    /// A connectivity candidate was malformed or inapplicable. Non-fatal;
    /// the session keeps waiting for further candidates.
    #[error("candidate rejected: {0}")]
    Candidate(String),

    /// Rendezvous channel failure (connect, serialize, send).
    #[error("rendezvous channel error: {0}")]
    Channel(String),
}
