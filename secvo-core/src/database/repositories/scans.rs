use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secvo_model::{
    NewScan, NewVulnerability, RiskLevel, Scan, ScanId, ScanStatus, Severity,
    UserId, Vulnerability,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::database::ports::scans::{CompletionOutcome, ScanRepository};
use crate::error::{CoreError, Result};

const SCAN_COLUMNS: &str = "id, url, user_id, status, risk_level, scan_date";

#[derive(Debug, Clone)]
pub struct PostgresScanRepository {
    pool: PgPool,
}

impl PostgresScanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: ScanRow) -> Scan {
        Scan {
            id: ScanId(row.id),
            url: row.url,
            user_id: UserId(row.user_id),
            status: row.status,
            risk_level: row.risk_level,
            scan_date: row.scan_date,
        }
    }

    fn map_finding(row: VulnerabilityRow) -> Vulnerability {
        Vulnerability {
            id: row.id,
            scan_id: ScanId(row.scan_id),
            name: row.name,
            description: row.description,
            severity: row.severity,
            recommendation: row.recommendation,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ScanRow {
    id: Uuid,
    url: String,
    user_id: Uuid,
    status: ScanStatus,
    risk_level: Option<RiskLevel>,
    scan_date: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct VulnerabilityRow {
    id: Uuid,
    scan_id: Uuid,
    name: String,
    description: String,
    severity: Severity,
    recommendation: String,
}

#[async_trait]
impl ScanRepository for PostgresScanRepository {
    async fn create_scan(&self, scan: NewScan) -> Result<Scan> {
        let row = sqlx::query_as::<_, ScanRow>(&format!(
            r#"
            INSERT INTO scans (id, url, user_id, status, risk_level, scan_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SCAN_COLUMNS}
            "#
        ))
        .bind(scan.id.to_uuid())
        .bind(&scan.url)
        .bind(scan.user_id.to_uuid())
        .bind(scan.status)
        .bind(scan.risk_level)
        .bind(scan.scan_date)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to create scan: {e}"))
        })?;

        Ok(Self::map_row(row))
    }

    async fn get_scan(&self, id: ScanId) -> Result<Option<Scan>> {
        let row = sqlx::query_as::<_, ScanRow>(&format!(
            "SELECT {SCAN_COLUMNS} FROM scans WHERE id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Self::map_row))
    }

    async fn list_scans_for_user(&self, user_id: UserId) -> Result<Vec<Scan>> {
        let rows = sqlx::query_as::<_, ScanRow>(&format!(
            r#"
            SELECT {SCAN_COLUMNS}
            FROM scans
            WHERE user_id = $1
            ORDER BY scan_date DESC, id DESC
            "#
        ))
        .bind(user_id.to_uuid())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Self::map_row).collect())
    }

    async fn list_findings(&self, scan_id: ScanId) -> Result<Vec<Vulnerability>> {
        let rows = sqlx::query_as::<_, VulnerabilityRow>(
            r#"
            SELECT id, scan_id, name, description, severity, recommendation
            FROM vulnerabilities
            WHERE scan_id = $1
            ORDER BY id
            "#,
        )
        .bind(scan_id.to_uuid())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Self::map_finding).collect())
    }

    async fn begin_processing(&self, id: ScanId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE scans SET status = 'processing' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id.to_uuid())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn complete_scan(
        &self,
        id: ScanId,
        risk_level: RiskLevel,
        findings: Vec<NewVulnerability>,
    ) -> Result<CompletionOutcome> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, ScanRow>(&format!(
            r#"
            UPDATE scans
            SET status = 'completed', risk_level = $2
            WHERE id = $1 AND status = 'processing'
            RETURNING {SCAN_COLUMNS}
            "#
        ))
        .bind(id.to_uuid())
        .bind(risk_level)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to complete scan {id}: {e}"))
        })?;

        let Some(row) = updated else {
            tx.rollback().await?;
            debug!(scan_id = %id, "completion rejected by status guard");
            return Ok(match self.get_scan(id).await? {
                Some(scan) => CompletionOutcome::Rejected { scan },
                None => CompletionOutcome::Missing,
            });
        };

        let stored: Vec<Vulnerability> = findings
            .into_iter()
            .map(|finding| finding.into_vulnerability(Uuid::now_v7(), id))
            .collect();

        if !stored.is_empty() {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO vulnerabilities (id, scan_id, name, description, severity, recommendation) ",
            );
            builder.push_values(stored.iter(), |mut b, finding| {
                b.push_bind(finding.id)
                    .push_bind(finding.scan_id.to_uuid())
                    .push_bind(finding.name.clone())
                    .push_bind(finding.description.clone())
                    .push_bind(finding.severity)
                    .push_bind(finding.recommendation.clone());
            });
            builder.build().execute(&mut *tx).await.map_err(|e| {
                CoreError::Internal(format!(
                    "Failed to insert findings for scan {id}: {e}"
                ))
            })?;
        }

        tx.commit().await?;

        Ok(CompletionOutcome::Applied {
            scan: Self::map_row(row),
            findings: stored,
        })
    }

    async fn fail_scan(&self, id: ScanId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE scans SET status = 'failed', risk_level = NULL WHERE id = $1 AND status = 'processing'",
        )
        .bind(id.to_uuid())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_stale_processing(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Scan>> {
        let rows = sqlx::query_as::<_, ScanRow>(&format!(
            r#"
            SELECT {SCAN_COLUMNS}
            FROM scans
            WHERE status = 'processing' AND scan_date < $1
            ORDER BY scan_date ASC
            LIMIT $2
            "#
        ))
        .bind(started_before)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Self::map_row).collect())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }
}
