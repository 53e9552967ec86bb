use multicam_core::CandidateInit;
use std::collections::VecDeque;

/// Holds connectivity candidates that arrived before the peer's negotiated
/// description was applied.
///
/// Candidates share the relay channel with the offer/answer exchange and
/// can race ahead of it; applying one against an unset remote description
/// fails silently in many transport stacks. The buffer withholds them until
/// negotiation completes, then releases them in arrival order. Strict FIFO:
/// no reordering, deduplication, or dropping.
#[derive(Default)]
pub struct CandidateBuffer {
    queued: VecDeque<CandidateInit>,
}

impl CandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, candidate: CandidateInit) {
        self.queued.push_back(candidate);
    }

    /// Drain all buffered candidates in arrival order.
    pub fn flush(&mut self) -> Vec<CandidateInit> {
        self.queued.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn clear(&mut self) {
        self.queued.clear();
    }
}
