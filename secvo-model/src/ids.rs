use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Strongly typed ID for scan records
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ScanId(pub Uuid);

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanId {
    pub fn new() -> Self {
        ScanId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for ScanId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ScanId {
    fn from(value: Uuid) -> Self {
        ScanId(value)
    }
}

impl FromStr for ScanId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(ScanId)
            .map_err(|_| ModelError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ID for user accounts
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl UserId {
    pub fn new() -> Self {
        UserId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        UserId(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_id_parses_hyphenated_uuid() {
        let id = ScanId::new();
        let parsed: ScanId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn scan_id_rejects_garbage() {
        assert!(matches!(
            "not-a-uuid".parse::<ScanId>(),
            Err(ModelError::InvalidId(_))
        ));
    }
}
