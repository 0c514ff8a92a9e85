//! Bounded-concurrency execution of fetch units.
//!
//! Units run in consecutive chunks of `limit`: every fetch of a chunk is
//! started together and the whole chunk must finish before the next one
//! starts. Peak concurrency is therefore exactly `limit`. Results come back in
//! input order no matter which fetch completes first.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;

use crate::core::{FetchUnit, OrdersError};

/// Default number of units in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Shared flag a caller raises to stop a run from scheduling more chunks.
///
/// Work already in flight is allowed to drain.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Seen by every clone.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The outcome of one scheduled unit.
pub type UnitResult<T> = (FetchUnit, Result<T, OrdersError>);

/// Runs `fetch` over `units`, at most `limit` at a time, in chunks.
///
/// A failing unit never affects its siblings; its error is returned in its
/// slot. When `cancel` is raised, no further chunk is started and the
/// unstarted units are reported as [`OrdersError::Cancelled`].
///
/// # Errors
///
/// Returns [`OrdersError::InvalidParams`] if `limit` is zero.
pub async fn run_chunked<T, F, Fut>(
    units: &[FetchUnit],
    limit: usize,
    cancel: Option<&CancelFlag>,
    fetch: F,
) -> Result<Vec<UnitResult<T>>, OrdersError>
where
    F: Fn(FetchUnit) -> Fut,
    Fut: Future<Output = Result<T, OrdersError>>,
{
    if limit == 0 {
        return Err(OrdersError::InvalidParams(
            "concurrency limit must be > 0".into(),
        ));
    }

    let mut out = Vec::with_capacity(units.len());

    #[cfg(feature = "tracing")]
    let total_chunks = units.len().div_ceil(limit);

    for (_idx, chunk) in units.chunks(limit).enumerate() {
        if cancel.is_some_and(CancelFlag::is_cancelled) {
            #[cfg(feature = "tracing")]
            tracing::info!(
                remaining = units.len() - out.len(),
                "cancellation requested, not scheduling further chunks"
            );
            break;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            chunk = _idx + 1,
            of = total_chunks,
            size = chunk.len(),
            "starting chunk"
        );

        let results = join_all(chunk.iter().map(|&unit| fetch(unit))).await;
        out.extend(chunk.iter().copied().zip(results));
    }

    let done = out.len();
    out.extend(
        units[done..]
            .iter()
            .map(|&unit| (unit, Err(OrdersError::Cancelled))),
    );
    Ok(out)
}
