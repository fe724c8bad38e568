use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secvo_model::{
    NewScan, NewVulnerability, RiskLevel, Scan, ScanId, ScanStatus, UserId,
    Vulnerability,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::ports::{
    scans::{CompletionOutcome, ScanRepository},
    sessions::{NewSession, SessionRecord, SessionRepository},
    users::{NewUser, UserRecord, UserRepository},
};
use crate::error::{CoreError, Result};

#[derive(Default)]
struct StoreState {
    scans: HashMap<ScanId, Scan>,
    findings: HashMap<ScanId, Vec<Vulnerability>>,
    users: HashMap<UserId, UserRecord>,
    sessions: HashMap<Uuid, SessionRecord>,
}

/// Single-process store backing every repository port with one lock, so a
/// guarded completion and its findings land together.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a scan's `scan_date`. Lets tests age a record past the stale
    /// threshold without sleeping.
    pub async fn backdate_scan(&self, id: ScanId, scan_date: DateTime<Utc>) {
        if let Some(scan) = self.state.lock().await.scans.get_mut(&id) {
            scan.scan_date = scan_date;
        }
    }
}

#[async_trait]
impl ScanRepository for InMemoryStore {
    async fn create_scan(&self, scan: NewScan) -> Result<Scan> {
        let mut state = self.state.lock().await;
        if state.scans.contains_key(&scan.id) {
            return Err(CoreError::Conflict(format!(
                "Scan {} already exists",
                scan.id
            )));
        }
        let scan: Scan = scan.into();
        state.scans.insert(scan.id, scan.clone());
        Ok(scan)
    }

    async fn get_scan(&self, id: ScanId) -> Result<Option<Scan>> {
        Ok(self.state.lock().await.scans.get(&id).cloned())
    }

    async fn list_scans_for_user(&self, user_id: UserId) -> Result<Vec<Scan>> {
        let state = self.state.lock().await;
        let mut scans: Vec<Scan> = state
            .scans
            .values()
            .filter(|scan| scan.user_id == user_id)
            .cloned()
            .collect();
        scans.sort_by(|a, b| {
            b.scan_date.cmp(&a.scan_date).then_with(|| b.id.cmp(&a.id))
        });
        Ok(scans)
    }

    async fn list_findings(&self, scan_id: ScanId) -> Result<Vec<Vulnerability>> {
        Ok(self
            .state
            .lock()
            .await
            .findings
            .get(&scan_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn begin_processing(&self, id: ScanId) -> Result<bool> {
        let mut state = self.state.lock().await;
        match state.scans.get_mut(&id) {
            Some(scan) if scan.status == ScanStatus::Pending => {
                scan.status = ScanStatus::Processing;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_scan(
        &self,
        id: ScanId,
        risk_level: RiskLevel,
        findings: Vec<NewVulnerability>,
    ) -> Result<CompletionOutcome> {
        let mut state = self.state.lock().await;
        let Some(scan) = state.scans.get_mut(&id) else {
            return Ok(CompletionOutcome::Missing);
        };
        if scan.status != ScanStatus::Processing {
            return Ok(CompletionOutcome::Rejected { scan: scan.clone() });
        }

        scan.status = ScanStatus::Completed;
        scan.risk_level = Some(risk_level);
        let scan = scan.clone();

        let stored: Vec<Vulnerability> = findings
            .into_iter()
            .map(|finding| finding.into_vulnerability(Uuid::now_v7(), id))
            .collect();
        state
            .findings
            .entry(id)
            .or_default()
            .extend(stored.iter().cloned());

        Ok(CompletionOutcome::Applied {
            scan,
            findings: stored,
        })
    }

    async fn fail_scan(&self, id: ScanId) -> Result<bool> {
        let mut state = self.state.lock().await;
        match state.scans.get_mut(&id) {
            Some(scan) if scan.status == ScanStatus::Processing => {
                scan.status = ScanStatus::Failed;
                scan.risk_level = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_stale_processing(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Scan>> {
        let state = self.state.lock().await;
        let mut stale: Vec<Scan> = state
            .scans
            .values()
            .filter(|scan| scan.is_processing() && scan.scan_date < started_before)
            .cloned()
            .collect();
        stale.sort_by_key(|scan| scan.scan_date);
        stale.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(stale)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(CoreError::Conflict(format!(
                "Email {} is already registered",
                user.email
            )));
        }
        let record = UserRecord {
            id: UserId::new(),
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord> {
        let record = SessionRecord {
            id: Uuid::now_v7(),
            user_id: session.user_id,
            token_hash: session.token_hash,
            created_at: Utc::now(),
            expires_at: session.expires_at,
            revoked_at: None,
        };
        self.state
            .lock()
            .await
            .sessions
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_active_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .sessions
            .values()
            .find(|s| s.token_hash == token_hash && s.is_active_at(now))
            .cloned())
    }

    async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut state = self.state.lock().await;
        match state.sessions.get_mut(&id) {
            Some(session) if session.revoked_at.is_none() => {
                session.revoked_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64> {
        let mut state = self.state.lock().await;
        let initial = state.sessions.len();
        state.sessions.retain(|_, session| session.expires_at >= before);
        Ok((initial - state.sessions.len()) as u64)
    }
}
