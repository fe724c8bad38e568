use std::fmt;

use chrono::{Duration, Utc};
use secvo_model::ScanId;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    database::ports::scans::ScanRepository,
    domain::scan::processor::{ProcessError, ScanProcessor},
    error::Result,
};

const DEFAULT_STALE_AFTER_SECS: i64 = 120;
const SWEEP_BATCH: i64 = 100;

/// Runs the processor off the request path.
///
/// Every dispatch is an independent spawned task; duplicate dispatches of the
/// same scan are harmless because completion is guarded in the store.
pub struct ScanDispatcher<R>
where
    R: ScanRepository + ?Sized,
{
    processor: ScanProcessor<R>,
    stale_after: Duration,
}

impl<R> Clone for ScanDispatcher<R>
where
    R: ScanRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            processor: self.processor.clone(),
            stale_after: self.stale_after,
        }
    }
}

impl<R> fmt::Debug for ScanDispatcher<R>
where
    R: ScanRepository + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanDispatcher")
            .field("processor", &self.processor)
            .field("stale_after", &self.stale_after)
            .finish()
    }
}

impl<R> ScanDispatcher<R>
where
    R: ScanRepository + ?Sized + 'static,
{
    pub fn new(processor: ScanProcessor<R>) -> Self {
        Self {
            processor,
            stale_after: Duration::seconds(DEFAULT_STALE_AFTER_SECS),
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn processor(&self) -> &ScanProcessor<R> {
        &self.processor
    }

    /// Process `scan_id` in the background. Failures are logged, never
    /// retried here.
    pub fn dispatch(&self, scan_id: ScanId, url: Option<String>) -> JoinHandle<()> {
        let processor = self.processor.clone();
        tokio::spawn(async move {
            match processor.process(scan_id, url.as_deref()).await {
                Ok(outcome) => debug!(
                    %scan_id,
                    status = %outcome.status,
                    applied = outcome.applied,
                    "background processing finished"
                ),
                Err(ProcessError::NotFound(_)) => {
                    warn!(%scan_id, "dispatched scan no longer exists")
                }
                Err(err) => {
                    warn!(%scan_id, error = %err, "background processing failed")
                }
            }
        })
    }

    /// Re-dispatch scans stuck in `processing` for longer than the stale
    /// threshold, e.g. after a restart dropped their tasks. Returns how many
    /// were dispatched.
    pub async fn sweep_stale(&self) -> Result<usize> {
        let cutoff = Utc::now() - self.stale_after;
        let stale = self
            .processor
            .repository()
            .list_stale_processing(cutoff, SWEEP_BATCH)
            .await?;

        for scan in &stale {
            self.dispatch(scan.id, Some(scan.url.clone()));
        }

        if !stale.is_empty() {
            info!(count = stale.len(), "re-dispatched stale scans");
        }
        Ok(stale.len())
    }
}
