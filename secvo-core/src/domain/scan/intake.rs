use std::{any::type_name_of_val, fmt, sync::Arc};

use chrono::Utc;
use secvo_model::{NewScan, Scan, Session};
use thiserror::Error;
use tracing::info;

use crate::{database::ports::scans::ScanRepository, error::CoreError};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Please sign in to scan websites")]
    Unauthenticated,
    #[error("Please enter a website URL")]
    EmptyUrl,
    #[error(transparent)]
    Storage(#[from] CoreError),
}

/// Turns a signed-in user's URL submission into a `processing` scan record.
pub struct ScanIntake<R>
where
    R: ScanRepository + ?Sized,
{
    repository: Arc<R>,
}

impl<R> Clone for ScanIntake<R>
where
    R: ScanRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> fmt::Debug for ScanIntake<R>
where
    R: ScanRepository + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanIntake")
            .field("repository", &type_name_of_val(self.repository.as_ref()))
            .finish()
    }
}

impl<R> ScanIntake<R>
where
    R: ScanRepository + ?Sized,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// The URL is accepted verbatim after trimming; only emptiness is
    /// rejected.
    pub async fn submit(
        &self,
        session: Option<&Session>,
        url: &str,
    ) -> Result<Scan, IntakeError> {
        let session = session
            .filter(|session| !session.is_expired_at(Utc::now()))
            .ok_or(IntakeError::Unauthenticated)?;

        let url = url.trim();
        if url.is_empty() {
            return Err(IntakeError::EmptyUrl);
        }

        let scan = self
            .repository
            .create_scan(NewScan::processing(url, session.user_id))
            .await?;

        info!(scan_id = %scan.id, user_id = %scan.user_id, url = %scan.url, "scan submitted");
        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryStore;
    use chrono::Duration;
    use secvo_model::{RiskLevel, ScanStatus, UserId};
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            session_id: Uuid::now_v7(),
            user_id: UserId::new(),
            email: "user@example.com".into(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn creates_processing_scan_for_owner() {
        let store = Arc::new(InMemoryStore::new());
        let intake = ScanIntake::new(Arc::clone(&store));
        let session = session();

        let scan = intake
            .submit(Some(&session), "  https://example.com  ")
            .await
            .unwrap();

        assert_eq!(scan.url, "https://example.com");
        assert_eq!(scan.user_id, session.user_id);
        assert_eq!(scan.status, ScanStatus::Processing);
        assert_eq!(scan.risk_level, Some(RiskLevel::Pending));
        assert_eq!(store.get_scan(scan.id).await.unwrap(), Some(scan));
    }

    #[tokio::test]
    async fn rejects_missing_or_expired_session() {
        let store = Arc::new(InMemoryStore::new());
        let intake = ScanIntake::new(Arc::clone(&store));

        assert!(matches!(
            intake.submit(None, "https://example.com").await,
            Err(IntakeError::Unauthenticated)
        ));

        let mut expired = session();
        expired.expires_at = Utc::now() - Duration::seconds(1);
        assert!(matches!(
            intake.submit(Some(&expired), "https://example.com").await,
            Err(IntakeError::Unauthenticated)
        ));
        assert!(
            store
                .list_scans_for_user(expired.user_id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn rejects_blank_url_without_writing() {
        let store = Arc::new(InMemoryStore::new());
        let intake = ScanIntake::new(Arc::clone(&store));
        let session = session();

        assert!(matches!(
            intake.submit(Some(&session), "   ").await,
            Err(IntakeError::EmptyUrl)
        ));
        assert!(
            store
                .list_scans_for_user(session.user_id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn accepts_arbitrary_text() {
        let intake = ScanIntake::new(Arc::new(InMemoryStore::new()));
        let scan = intake.submit(Some(&session()), "not a url").await.unwrap();
        assert_eq!(scan.url, "not a url");
    }
}
