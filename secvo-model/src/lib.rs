//! Core data model definitions shared across Secvo crates.
#![allow(missing_docs)]

pub mod api;
pub mod error;
pub mod ids;
pub mod scan;
pub mod session;
pub mod vulnerability;

pub use api::{
    ApiResponse, AuthTokens, Credentials, ProcessScanRequest,
    ProcessScanResponse, ScanReport, SubmitScanRequest, UserProfile,
};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ScanId, UserId};
pub use scan::{NewScan, RiskLevel, Scan, ScanStatus};
pub use session::Session;
pub use vulnerability::{
    NewVulnerability, Severity, SeverityCounts, Vulnerability,
};
