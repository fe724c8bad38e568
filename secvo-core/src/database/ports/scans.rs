use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secvo_model::{
    NewScan, NewVulnerability, RiskLevel, Scan, ScanId, UserId, Vulnerability,
};

use crate::error::Result;

/// Result of a guarded completion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The scan was still processing; status, risk level and findings were
    /// written together.
    Applied {
        scan: Scan,
        findings: Vec<Vulnerability>,
    },
    /// Another writer settled the scan first. Carries the stored state.
    Rejected { scan: Scan },
    /// No scan with that id exists.
    Missing,
}

#[async_trait]
pub trait ScanRepository: Send + Sync {
    async fn create_scan(&self, scan: NewScan) -> Result<Scan>;

    async fn get_scan(&self, id: ScanId) -> Result<Option<Scan>>;

    /// Every scan owned by `user_id`, most recent `scan_date` first.
    async fn list_scans_for_user(&self, user_id: UserId) -> Result<Vec<Scan>>;

    async fn list_findings(&self, scan_id: ScanId) -> Result<Vec<Vulnerability>>;

    /// Move a `pending` scan to `processing`. Returns `false` when the scan
    /// was not pending.
    async fn begin_processing(&self, id: ScanId) -> Result<bool>;

    /// Atomically set `completed`, the risk level, and insert the findings,
    /// but only while the scan is still `processing`.
    async fn complete_scan(
        &self,
        id: ScanId,
        risk_level: RiskLevel,
        findings: Vec<NewVulnerability>,
    ) -> Result<CompletionOutcome>;

    /// Move a `processing` scan to `failed`. Returns `false` when the scan
    /// was no longer processing.
    async fn fail_scan(&self, id: ScanId) -> Result<bool>;

    /// Scans still `processing` whose `scan_date` is older than
    /// `started_before`, oldest first.
    async fn list_stale_processing(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Scan>>;

    /// Cheap liveness check against the backing store.
    async fn ping(&self) -> Result<()>;
}
