use serde::{Deserialize, Serialize};
use std::ops::Add;

use crate::error::ScorerError;

// ============================================================================
// Tallies
// ============================================================================

/// A passed/total tally normalized from a checker's report.
///
/// `total == 0` means the checker gave us nothing to go on. The collector never
/// lets such a tally reach the score calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountPair {
    pub passed: u32,
    pub total: u32,
}

impl CountPair {
    pub const fn new(passed: u32, total: u32) -> Self {
        assert!(passed <= total, "passed must not exceed total");
        Self { passed, total }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Pass ratio in [0, 1].
    ///
    /// Panics on an empty tally: the collector's fallback rule guarantees a
    /// non-zero total, so reaching this with zero is a bug upstream.
    pub fn ratio(&self) -> f64 {
        assert!(
            self.total > 0,
            "pass ratio requested for an empty tally ({}/{})",
            self.passed,
            self.total
        );
        self.passed as f64 / self.total as f64
    }

    /// Pass rate as a percentage, or `None` for an empty tally.
    pub fn percent(&self) -> Option<f64> {
        (self.total > 0).then(|| self.passed as f64 / self.total as f64 * 100.0)
    }
}

impl Add for CountPair {
    type Output = CountPair;

    fn add(self, rhs: CountPair) -> CountPair {
        CountPair {
            passed: self.passed + rhs.passed,
            total: self.total + rhs.total,
        }
    }
}

/// Outcome of the static hardcoded-secrets inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsScanResult {
    pub issues_fixed: u32,
    pub total_issues: u32,
}

impl SecretsScanResult {
    pub fn ratio(&self) -> f64 {
        assert!(
            self.total_issues > 0,
            "secrets scan reported no known issues to fix"
        );
        self.issues_fixed as f64 / self.total_issues as f64
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Normalized results of one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    pub security: SecurityResults,
    pub performance: PerformanceMetrics,
    pub quality: QualityMetrics,
    pub logic: LogicResults,
}

/// A known reference snapshot, compared against on every run.
pub type Baseline = TestResults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityResults {
    pub sql_injection_tests: CountPair,
    pub xss_tests: CountPair,
    pub auth_tests: CountPair,
    pub secrets_scan: SecretsScanResult,
}

/// Lower is better for everything except `lighthouse_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// milliseconds
    pub response_time: f64,
    /// megabytes
    pub memory_usage: f64,
    /// kilobytes
    pub bundle_size: f64,
    pub lighthouse_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub eslint_errors: u32,
    pub type_errors: u32,
    /// percent of lines, 0-100
    pub test_coverage: f64,
    /// percent, 0-100
    pub duplicate_code: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicResults {
    pub unit_tests: CountPair,
    pub integration_tests: CountPair,
    pub e2e_tests: CountPair,
}

impl TestResults {
    /// The reference state of the benchmark project before any agent touched it.
    pub fn reference_baseline() -> Baseline {
        TestResults {
            security: SecurityResults {
                sql_injection_tests: CountPair::new(0, 8),
                xss_tests: CountPair::new(0, 5),
                auth_tests: CountPair::new(2, 9),
                secrets_scan: SecretsScanResult {
                    issues_fixed: 0,
                    total_issues: 6,
                },
            },
            performance: PerformanceMetrics {
                response_time: 850.0,
                memory_usage: 145.0,
                bundle_size: 174.0,
                lighthouse_score: 55.0,
            },
            quality: QualityMetrics {
                eslint_errors: 2,
                type_errors: 1,
                test_coverage: 71.0,
                duplicate_code: 18.0,
            },
            logic: LogicResults {
                unit_tests: CountPair::new(9, 23),
                integration_tests: CountPair::new(6, 9),
                e2e_tests: CountPair::new(0, 2),
            },
        }
    }

    /// Named tallies, in report order.
    pub fn tallies(&self) -> [(&'static str, CountPair); 6] {
        [
            ("sqlInjectionTests", self.security.sql_injection_tests),
            ("xssTests", self.security.xss_tests),
            ("authTests", self.security.auth_tests),
            ("unitTests", self.logic.unit_tests),
            ("integrationTests", self.logic.integration_tests),
            ("e2eTests", self.logic.e2e_tests),
        ]
    }

    /// True when any tally, or the secrets scan, has nothing to divide by.
    pub fn has_empty_tally(&self) -> bool {
        self.tallies().iter().any(|(_, tally)| tally.is_empty())
            || self.security.secrets_scan.total_issues == 0
    }

    /// Reject snapshots that could not have come out of the collector.
    ///
    /// Deserialization bypasses `CountPair::new`, so externally supplied
    /// baselines are checked here. Every tally must be non-empty since the
    /// calculator takes its pass ratio.
    pub fn validate(&self) -> Result<(), ScorerError> {
        for (name, tally) in self.tallies() {
            if tally.is_empty() {
                return Err(ScorerError::Other(format!("{}: total is 0", name)));
            }
            if tally.passed > tally.total {
                return Err(ScorerError::Other(format!(
                    "{}: passed ({}) exceeds total ({})",
                    name, tally.passed, tally.total
                )));
            }
        }
        let secrets = &self.security.secrets_scan;
        if secrets.total_issues == 0 {
            return Err(ScorerError::Other(
                "secretsScan: totalIssues is 0".to_string(),
            ));
        }
        if secrets.issues_fixed > secrets.total_issues {
            return Err(ScorerError::Other(format!(
                "secretsScan: issuesFixed ({}) exceeds totalIssues ({})",
                secrets.issues_fixed, secrets.total_issues
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_pairs_add_componentwise() {
        let merged = CountPair::new(5, 17) + CountPair::new(4, 6);
        assert_eq!(merged, CountPair::new(9, 23));
    }

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(CountPair::new(0, 4).ratio(), 0.0);
        assert_eq!(CountPair::new(4, 4).ratio(), 1.0);
        assert!((CountPair::new(1, 3).ratio() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "empty tally")]
    fn test_ratio_of_empty_tally_panics() {
        CountPair::default().ratio();
    }

    #[test]
    fn test_percent_of_empty_tally_is_none() {
        assert!(CountPair::default().percent().is_none());
        assert_eq!(CountPair::new(1, 2).percent(), Some(50.0));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(TestResults::reference_baseline()).unwrap();
        assert_eq!(json["security"]["sqlInjectionTests"]["total"], 8);
        assert_eq!(json["security"]["secretsScan"]["totalIssues"], 6);
        assert_eq!(json["logic"]["e2eTests"]["total"], 2);
        assert_eq!(json["quality"]["eslintErrors"], 2);
    }

    #[test]
    fn test_validate_rejects_impossible_tally() {
        let mut baseline = TestResults::reference_baseline();
        baseline.logic.unit_tests = CountPair {
            passed: 30,
            total: 23,
        };
        let err = baseline.validate().unwrap_err();
        assert!(err.to_string().contains("unitTests"));
    }

    #[test]
    fn test_validate_rejects_empty_tally() {
        let mut baseline = TestResults::reference_baseline();
        assert!(!baseline.has_empty_tally());
        baseline.logic.e2e_tests = CountPair::default();
        assert!(baseline.has_empty_tally());
        let err = baseline.validate().unwrap_err();
        assert!(err.to_string().contains("e2eTests: total is 0"));
    }

    #[test]
    fn test_validate_rejects_empty_secrets_scan() {
        let mut baseline = TestResults::reference_baseline();
        baseline.security.secrets_scan.total_issues = 0;
        assert!(baseline.has_empty_tally());
        let err = baseline.validate().unwrap_err();
        assert!(err.to_string().contains("totalIssues"));
    }
}
