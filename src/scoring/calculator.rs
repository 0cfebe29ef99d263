use serde::{Deserialize, Serialize};

use crate::config::{
    LOGIC_WEIGHT, PERFORMANCE_WEIGHT, QUALITY_WEIGHT, REGRESSION_PENALTY, SECURITY_WEIGHT,
};
use crate::results::{
    Baseline, LogicResults, PerformanceMetrics, QualityMetrics, SecurityResults, TestResults,
};

/// Category scores (each 0-100) and the weighted, penalized total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub security: f64,
    pub performance: f64,
    pub quality: f64,
    pub logic: f64,
    pub total: f64,
    pub regressions: u32,
}

impl ScoreBreakdown {
    /// Categories with their weights, in report order.
    pub fn weighted_categories(&self) -> [(&'static str, f64, f64); 4] {
        [
            ("Security", self.security, SECURITY_WEIGHT),
            ("Performance", self.performance, PERFORMANCE_WEIGHT),
            ("Code Quality", self.quality, QUALITY_WEIGHT),
            ("Business Logic", self.logic, LOGIC_WEIGHT),
        ]
    }
}

pub fn calculate_score(results: &TestResults, baseline: &Baseline) -> ScoreBreakdown {
    let security = security_score(&results.security);
    let performance = performance_score(&results.performance, &baseline.performance);
    let quality = quality_score(&results.quality, &baseline.quality);
    let logic = logic_score(&results.logic);
    let regressions = count_regressions(&results.logic, &baseline.logic);

    let weighted = SECURITY_WEIGHT * security
        + PERFORMANCE_WEIGHT * performance
        + QUALITY_WEIGHT * quality
        + LOGIC_WEIGHT * logic;
    let weight_sum = SECURITY_WEIGHT + PERFORMANCE_WEIGHT + QUALITY_WEIGHT + LOGIC_WEIGHT;
    let total = (weighted / weight_sum - REGRESSION_PENALTY * regressions as f64).max(0.0);

    ScoreBreakdown {
        security,
        performance,
        quality,
        logic,
        total,
        regressions,
    }
}

fn security_score(security: &SecurityResults) -> f64 {
    security.sql_injection_tests.ratio() * 30.0
        + security.xss_tests.ratio() * 30.0
        + security.auth_tests.ratio() * 25.0
        + security.secrets_scan.ratio() * 15.0
}

/// Lower-is-better metrics earn up to `weight` for matching or beating the
/// baseline; beating it further earns nothing extra.
fn performance_score(current: &PerformanceMetrics, baseline: &PerformanceMetrics) -> f64 {
    capped(30.0, baseline.response_time, current.response_time)
        + capped(25.0, baseline.memory_usage, current.memory_usage)
        + current.lighthouse_score * 0.25
        + capped(20.0, baseline.bundle_size, current.bundle_size)
}

// f64::min discards NaN, so a 0/0 still lands on the cap
fn capped(weight: f64, baseline: f64, current: f64) -> f64 {
    (weight * baseline / current).min(weight)
}

fn quality_score(current: &QualityMetrics, baseline: &QualityMetrics) -> f64 {
    error_reduction(current.eslint_errors, baseline.eslint_errors) * 30.0
        + error_reduction(current.type_errors, baseline.type_errors) * 25.0
        + current.test_coverage * 0.3
        + (1.0 - current.duplicate_code / 100.0).max(0.0) * 15.0
}

/// Fraction of the baseline's errors that are gone, in [0, 1].
///
/// A clean baseline has nothing to reduce: staying clean earns the full term,
/// introducing any error earns none.
fn error_reduction(current: u32, baseline: u32) -> f64 {
    if baseline == 0 {
        return if current == 0 { 1.0 } else { 0.0 };
    }
    (1.0 - current as f64 / baseline as f64).max(0.0)
}

fn logic_score(logic: &LogicResults) -> f64 {
    logic.unit_tests.ratio() * 40.0
        + logic.integration_tests.ratio() * 35.0
        + logic.e2e_tests.ratio() * 25.0
}

/// Tests that passed in the baseline but no longer pass.
pub fn count_regressions(current: &LogicResults, baseline: &LogicResults) -> u32 {
    [
        (current.unit_tests, baseline.unit_tests),
        (current.integration_tests, baseline.integration_tests),
        (current.e2e_tests, baseline.e2e_tests),
    ]
    .iter()
    .map(|(now, before)| before.passed.saturating_sub(now.passed))
    .sum()
}
