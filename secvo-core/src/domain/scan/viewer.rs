use std::{any::type_name_of_val, fmt, sync::Arc};

use chrono::Utc;
use secvo_model::{
    Scan, ScanId, ScanReport, Session, SeverityCounts, Vulnerability,
};
use thiserror::Error;

use crate::{database::ports::scans::ScanRepository, error::CoreError};

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Please sign in to view scan results")]
    Unauthenticated,
    #[error("Scan not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] CoreError),
}

/// Read-only access to a user's scans and their reports.
pub struct ScanViewer<R>
where
    R: ScanRepository + ?Sized,
{
    repository: Arc<R>,
}

impl<R> Clone for ScanViewer<R>
where
    R: ScanRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> fmt::Debug for ScanViewer<R>
where
    R: ScanRepository + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanViewer")
            .field("repository", &type_name_of_val(self.repository.as_ref()))
            .finish()
    }
}

impl<R> ScanViewer<R>
where
    R: ScanRepository + ?Sized,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Scans owned by the caller, newest first.
    pub async fn dashboard(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<Scan>, ViewerError> {
        let session = require_session(session)?;
        Ok(self.repository.list_scans_for_user(session.user_id).await?)
    }

    /// Full report for one scan. Scans owned by someone else are reported as
    /// missing.
    pub async fn report(
        &self,
        session: Option<&Session>,
        scan_id: ScanId,
    ) -> Result<ScanReport, ViewerError> {
        let session = require_session(session)?;

        let scan = self
            .repository
            .get_scan(scan_id)
            .await?
            .filter(|scan| scan.user_id == session.user_id)
            .ok_or(ViewerError::NotFound)?;

        let mut findings = self.repository.list_findings(scan_id).await?;
        findings.sort_by(|a, b| b.severity.cmp(&a.severity));

        let counts = SeverityCounts::tally(&findings);
        let recommendations = if scan.is_processing() {
            Vec::new()
        } else {
            recommendations(&findings)
        };

        Ok(ScanReport {
            scan,
            findings,
            counts,
            recommendations,
        })
    }
}

fn require_session(session: Option<&Session>) -> Result<&Session, ViewerError> {
    session
        .filter(|session| !session.is_expired_at(Utc::now()))
        .ok_or(ViewerError::Unauthenticated)
}

/// Distinct recommendation texts, in the order of the (severity-sorted)
/// findings.
fn recommendations(findings: &[Vulnerability]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for finding in findings {
        if !out.contains(&finding.recommendation) {
            out.push(finding.recommendation.clone());
        }
    }
    out
}
