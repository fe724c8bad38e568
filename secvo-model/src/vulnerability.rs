use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ModelError, ids::ScanId};

/// Severity of a single finding. Ordered so that `High` compares greatest.
#[derive(
    Clone,
    Copy,
    Debug,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "severity_level", rename_all = "lowercase")
)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(ModelError::UnknownVariant {
                kind: "severity",
                value: other.to_string(),
            }),
        }
    }
}

/// A reported issue attached to a completed scan.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vulnerability {
    pub id: Uuid,
    pub scan_id: ScanId,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub recommendation: String,
}

/// Insert payload for a finding. The store assigns the id and attaches it to
/// the scan being completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewVulnerability {
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub recommendation: String,
}

impl NewVulnerability {
    pub fn into_vulnerability(self, id: Uuid, scan_id: ScanId) -> Vulnerability {
        Vulnerability {
            id,
            scan_id,
            name: self.name,
            description: self.description,
            severity: self.severity,
            recommendation: self.recommendation,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl SeverityCounts {
    pub fn tally<'a, I>(findings: I) -> Self
    where
        I: IntoIterator<Item = &'a Vulnerability>,
    {
        findings
            .into_iter()
            .fold(Self::default(), |mut counts, finding| {
                match finding.severity {
                    Severity::High => counts.high += 1,
                    Severity::Medium => counts.medium += 1,
                    Severity::Low => counts.low += 1,
                }
                counts.total += 1;
                counts
            })
    }
}
