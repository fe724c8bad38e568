use std::{any::type_name_of_val, fmt, sync::Arc, time::Duration};

use secvo_model::{
    ProcessScanResponse, RiskLevel, Scan, ScanId, ScanStatus,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    database::ports::scans::{CompletionOutcome, ScanRepository},
    domain::scan::outcome::draw_outcome,
    error::CoreError,
};

const DEFAULT_SIMULATED_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorSettings {
    /// Stand-in for the time a real external scan would take.
    pub simulated_delay: Duration,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            simulated_delay: Duration::from_millis(DEFAULT_SIMULATED_DELAY_MS),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Scan not found")]
    NotFound(ScanId),
    #[error(transparent)]
    Storage(#[from] CoreError),
}

/// What a single `process` call observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub scan_id: ScanId,
    pub status: ScanStatus,
    pub risk_level: Option<RiskLevel>,
    pub vulnerabilities_count: usize,
    /// Whether this invocation performed the completion itself.
    pub applied: bool,
}

impl ProcessOutcome {
    pub fn to_response(&self) -> ProcessScanResponse {
        ProcessScanResponse {
            status: self.status,
            risk_level: self.risk_level,
            vulnerabilities_count: self.vulnerabilities_count,
        }
    }
}

/// Drives a scan from `processing` to a terminal state with a simulated
/// assessment.
///
/// Invocations are idempotent: a scan that is already `completed` or
/// `failed` is reported as stored, and concurrent invocations race on a
/// guarded completion so exactly one of them writes findings.
pub struct ScanProcessor<R>
where
    R: ScanRepository + ?Sized,
{
    repository: Arc<R>,
    settings: ProcessorSettings,
}

impl<R> Clone for ScanProcessor<R>
where
    R: ScanRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            settings: self.settings,
        }
    }
}

impl<R> fmt::Debug for ScanProcessor<R>
where
    R: ScanRepository + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanProcessor")
            .field("repository", &type_name_of_val(self.repository.as_ref()))
            .field("settings", &self.settings)
            .finish()
    }
}

impl<R> ScanProcessor<R>
where
    R: ScanRepository + ?Sized,
{
    pub fn new(repository: Arc<R>, settings: ProcessorSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// `url_hint` is only used for logging; the stored scan is
    /// authoritative.
    pub async fn process(
        &self,
        scan_id: ScanId,
        url_hint: Option<&str>,
    ) -> Result<ProcessOutcome, ProcessError> {
        let scan = self
            .repository
            .get_scan(scan_id)
            .await?
            .ok_or(ProcessError::NotFound(scan_id))?;

        if scan.is_terminal() {
            debug!(%scan_id, status = %scan.status, "scan already settled");
            return self.settled(scan).await;
        }

        if scan.status == ScanStatus::Pending
            && !self.repository.begin_processing(scan_id).await?
        {
            debug!(%scan_id, "scan left pending before processing began");
        }

        info!(
            %scan_id,
            url = url_hint.unwrap_or(scan.url.as_str()),
            "processing scan"
        );

        if !self.settings.simulated_delay.is_zero() {
            tokio::time::sleep(self.settings.simulated_delay).await;
        }

        let outcome = draw_outcome(&mut rand::rng());
        let risk_level = outcome.risk_level;

        match self
            .repository
            .complete_scan(scan_id, risk_level, outcome.findings)
            .await
        {
            Ok(CompletionOutcome::Applied { scan, findings }) => {
                info!(
                    %scan_id,
                    risk_level = %risk_level,
                    vulnerabilities = findings.len(),
                    "scan completed"
                );
                Ok(ProcessOutcome {
                    scan_id,
                    status: scan.status,
                    risk_level: scan.risk_level,
                    vulnerabilities_count: findings.len(),
                    applied: true,
                })
            }
            Ok(CompletionOutcome::Rejected { scan }) => {
                debug!(%scan_id, status = %scan.status, "another invocation settled the scan");
                self.settled(scan).await
            }
            Ok(CompletionOutcome::Missing) => Err(ProcessError::NotFound(scan_id)),
            Err(err) => {
                error!(%scan_id, error = %err, "failed to complete scan");
                match self.repository.fail_scan(scan_id).await {
                    Ok(true) => warn!(%scan_id, "scan marked as failed"),
                    Ok(false) => {}
                    Err(fail_err) => {
                        error!(%scan_id, error = %fail_err, "failed to mark scan as failed")
                    }
                }
                Err(ProcessError::Storage(err))
            }
        }
    }

    async fn settled(&self, scan: Scan) -> Result<ProcessOutcome, ProcessError> {
        let vulnerabilities_count =
            self.repository.list_findings(scan.id).await?.len();
        Ok(ProcessOutcome {
            scan_id: scan.id,
            status: scan.status,
            risk_level: scan.risk_level,
            vulnerabilities_count,
            applied: false,
        })
    }
}
