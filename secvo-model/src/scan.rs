use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ModelError,
    ids::{ScanId, UserId},
};

/// Lifecycle of a scan record.
///
/// `pending -> processing -> {completed, failed}`. Intake creates records
/// directly in `processing`; the terminal states are never left again.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "scan_status", rename_all = "lowercase")
)]
pub enum ScanStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Processing => "processing",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScanStatus::Pending),
            "processing" => Ok(ScanStatus::Processing),
            "completed" => Ok(ScanStatus::Completed),
            "failed" => Ok(ScanStatus::Failed),
            other => Err(ModelError::UnknownVariant {
                kind: "scan status",
                value: other.to_string(),
            }),
        }
    }
}

/// Coarse severity summary of a scan.
///
/// `Pending` is the placeholder written at intake; only the three assessed
/// levels are ever drawn by the processor.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "risk_level", rename_all = "lowercase")
)]
pub enum RiskLevel {
    Pending,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Levels a completed scan may carry.
    pub const ASSESSED: [RiskLevel; 3] =
        [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Pending => "pending",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn is_assessed(&self) -> bool {
        !matches!(self, RiskLevel::Pending)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RiskLevel::Pending),
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(ModelError::UnknownVariant {
                kind: "risk level",
                value: other.to_string(),
            }),
        }
    }
}

/// One URL's assessment request and its outcome.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scan {
    pub id: ScanId,
    pub url: String,
    pub user_id: UserId,
    pub status: ScanStatus,
    pub risk_level: Option<RiskLevel>,
    pub scan_date: DateTime<Utc>,
}

impl Scan {
    pub fn is_processing(&self) -> bool {
        matches!(self.status, ScanStatus::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Insert payload for a freshly submitted scan.
#[derive(Clone, Debug)]
pub struct NewScan {
    pub id: ScanId,
    pub url: String,
    pub user_id: UserId,
    pub status: ScanStatus,
    pub risk_level: Option<RiskLevel>,
    pub scan_date: DateTime<Utc>,
}

impl NewScan {
    /// A scan that starts its life in `processing` with a `pending` risk
    /// level, the shape intake always produces.
    pub fn processing(url: impl Into<String>, user_id: UserId) -> Self {
        Self {
            id: ScanId::new(),
            url: url.into(),
            user_id,
            status: ScanStatus::Processing,
            risk_level: Some(RiskLevel::Pending),
            scan_date: Utc::now(),
        }
    }
}

impl From<NewScan> for Scan {
    fn from(value: NewScan) -> Self {
        Scan {
            id: value.id,
            url: value.url,
            user_id: value.user_id,
            status: value.status,
            risk_level: value.risk_level,
            scan_date: value.scan_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_serialize_lowercase() {
        let json = serde_json::to_string(&ScanStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let level: RiskLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(level, RiskLevel::High);
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!ScanStatus::Pending.is_terminal());
        assert!(!ScanStatus::Processing.is_terminal());
        assert!(ScanStatus::Completed.is_terminal());
        assert!(ScanStatus::Failed.is_terminal());
    }

    #[test]
    fn intake_shape_is_processing_with_pending_risk() {
        let scan: Scan =
            NewScan::processing("https://example.com", UserId::new()).into();
        assert!(scan.is_processing());
        assert_eq!(scan.risk_level, Some(RiskLevel::Pending));
    }

    #[test]
    fn unknown_risk_level_is_rejected() {
        assert!("critical".parse::<RiskLevel>().is_err());
        assert!(RiskLevel::ASSESSED.iter().all(RiskLevel::is_assessed));
    }
}
