//! The segmentation-oracle boundary.
//!
//! Proposal generation is an external collaborator: several passes with
//! different sampling densities, each an independent unit of work with a
//! hard wall-clock deadline. A pass that exceeds its deadline is
//! discarded whole; partial results are never salvaged. A pass that
//! fails is logged and skipped. When every pass fails or times out the
//! pipeline simply proceeds with an empty proposal list - that is an
//! expected outcome, not an error. Retry policy, if any, belongs to the
//! oracle itself.

use crate::domain::RawProposal;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Boxed error type crossing the oracle boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A source of raw region proposals, typically a segmentation model
/// driven with several generator configurations.
pub trait ProposalSource: Send + Sync + 'static {
    /// Number of generator passes this source runs.
    fn pass_count(&self) -> usize;

    /// Runs one generator pass. Proposals may be in the coordinate space
    /// of a downscaled image; see [`rescale_proposals`].
    fn generate(&self, pass: usize) -> Result<Vec<RawProposal>, BoxError>;
}

/// Tagged outcome of a single deadline-bounded generator pass.
#[derive(Debug)]
pub enum PassOutcome {
    /// The pass finished within its deadline.
    Completed(Vec<RawProposal>),
    /// The deadline elapsed; the pass output is discarded entirely.
    TimedOut,
    /// The pass returned an error or panicked.
    Failed(BoxError),
}

/// Runs one generator pass on a worker thread, bounding the wait with
/// the given deadline. The caller never blocks past the deadline: a
/// timed-out worker is left to finish in the background and its output
/// is dropped.
pub fn run_pass_with_deadline<S: ProposalSource>(
    source: Arc<S>,
    pass: usize,
    deadline: Duration,
) -> PassOutcome {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name(format!("oracle-pass-{pass}"))
        .spawn(move || {
            let result = source.generate(pass);
            // The receiver may be gone if the deadline already elapsed.
            let _ = tx.send(result);
        });

    if let Err(e) = spawned {
        return PassOutcome::Failed(Box::new(e));
    }

    match rx.recv_timeout(deadline) {
        Ok(Ok(proposals)) => PassOutcome::Completed(proposals),
        Ok(Err(e)) => PassOutcome::Failed(e),
        Err(RecvTimeoutError::Timeout) => PassOutcome::TimedOut,
        Err(RecvTimeoutError::Disconnected) => {
            PassOutcome::Failed("oracle pass worker exited without a result".into())
        }
    }
}

/// Runs every generator pass under the deadline and concatenates the
/// surviving proposals. Failures and timeouts are logged and skipped;
/// an empty result is a valid outcome.
pub fn collect_proposals<S: ProposalSource>(source: Arc<S>, deadline: Duration) -> Vec<RawProposal> {
    let mut all = Vec::new();

    for pass in 0..source.pass_count() {
        match run_pass_with_deadline(Arc::clone(&source), pass, deadline) {
            PassOutcome::Completed(proposals) => {
                if proposals.is_empty() {
                    tracing::warn!(pass, "generator pass produced no proposals");
                    continue;
                }
                tracing::info!(pass, count = proposals.len(), "generator pass completed");
                all.extend(proposals);
            }
            PassOutcome::TimedOut => {
                tracing::warn!(pass, ?deadline, "generator pass timed out, skipping");
            }
            PassOutcome::Failed(error) => {
                tracing::warn!(pass, %error, "generator pass failed, skipping");
            }
        }
    }

    if all.is_empty() {
        tracing::warn!("all generator passes failed or produced nothing");
    }
    all
}

/// Maps proposals produced on a downscaled image back to the original
/// coordinate space: linear on x/y/w/h, quadratic on area. Proposals
/// that collapse to zero size are dropped. Rescaling runs in parallel
/// above the given threshold.
pub fn rescale_proposals(
    proposals: Vec<RawProposal>,
    scale: f64,
    parallel_threshold: usize,
) -> Vec<RawProposal> {
    if (scale - 1.0).abs() < f64::EPSILON {
        return proposals;
    }

    let rescale_one = |mut p: RawProposal| -> Option<RawProposal> {
        let w = (p.bbox.w as f64 / scale) as u32;
        let h = (p.bbox.h as f64 / scale) as u32;
        if w == 0 || h == 0 {
            return None;
        }
        p.bbox.x = (p.bbox.x as f64 / scale) as u32;
        p.bbox.y = (p.bbox.y as f64 / scale) as u32;
        p.bbox.w = w;
        p.bbox.h = h;
        p.area = (p.area as f64 / (scale * scale)) as u64;
        Some(p)
    };

    if proposals.len() > parallel_threshold {
        proposals.into_par_iter().filter_map(rescale_one).collect()
    } else {
        proposals.into_iter().filter_map(rescale_one).collect()
    }
}
