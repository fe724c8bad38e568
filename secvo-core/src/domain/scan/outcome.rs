use std::ops::RangeInclusive;

use rand::{Rng, seq::SliceRandom};
use secvo_model::{NewVulnerability, RiskLevel};

use crate::domain::scan::catalog::{CatalogEntry, FINDING_CATALOG};

/// A drawn scan result, ready to be applied by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub risk_level: RiskLevel,
    pub findings: Vec<NewVulnerability>,
}

/// Inclusive bounds for how many findings a scan of `risk_level` reports.
pub fn finding_count_range(risk_level: RiskLevel) -> RangeInclusive<usize> {
    match risk_level {
        RiskLevel::High => 3..=5,
        RiskLevel::Medium => 2..=3,
        RiskLevel::Low => 1..=2,
        RiskLevel::Pending => 0..=0,
    }
}

/// Draw a risk level uniformly, then a risk-dependent number of distinct
/// catalog entries in shuffled order.
pub fn draw_outcome<R: Rng + ?Sized>(rng: &mut R) -> ScanOutcome {
    let risk_level =
        RiskLevel::ASSESSED[rng.random_range(0..RiskLevel::ASSESSED.len())];
    let count = rng
        .random_range(finding_count_range(risk_level))
        .min(FINDING_CATALOG.len());

    let mut entries: Vec<&CatalogEntry> = FINDING_CATALOG.iter().collect();
    entries.shuffle(rng);

    ScanOutcome {
        risk_level,
        findings: entries
            .into_iter()
            .take(count)
            .map(CatalogEntry::to_new_vulnerability)
            .collect(),
    }
}
