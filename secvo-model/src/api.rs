use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ids::UserId,
    scan::{RiskLevel, Scan, ScanStatus},
    vulnerability::{SeverityCounts, Vulnerability},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

// ===== Scan types =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitScanRequest {
    #[serde(default)]
    pub url: String,
}

/// Body accepted by the processing trigger. Both fields are optional at the
/// wire level so that absence can be reported as a 400 rather than a decode
/// failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessScanRequest {
    #[serde(rename = "scanId", default)]
    pub scan_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessScanResponse {
    pub status: ScanStatus,
    pub risk_level: Option<RiskLevel>,
    pub vulnerabilities_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan: Scan,
    pub findings: Vec<Vulnerability>,
    pub counts: SeverityCounts,
    pub recommendations: Vec<String>,
}

// ===== Auth types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    pub user: UserProfile,
}
