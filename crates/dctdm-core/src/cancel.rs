//! Cooperative cancellation, polled between MCUs and between coefficient pairs.

/// Something that can tell a long-running operation to stop.
///
/// Implementations are expected to be cheap to query (an `AtomicBool` load,
/// typically) since decode/encode poll it at MCU and pair granularity.
pub trait CancellationToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// A token that never trips. Used whenever the caller doesn't care about cancellation.
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

pub(crate) fn check(token: Option<&dyn CancellationToken>) -> crate::error::Result<()> {
    if let Some(token) = token {
        if token.is_cancelled() {
            return Err(crate::error::DctdmError::Cancelled);
        }
    }
    Ok(())
}
