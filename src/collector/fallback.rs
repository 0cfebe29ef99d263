use crate::config::SECRETS_TOTAL_ISSUES;
use crate::results::{CountPair, SecretsScanResult};

/// Substitutes used when a domain produces no usable measurement.
///
/// These are the reference project's own numbers, so a domain that cannot be
/// measured scores as if nothing changed there.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackTable {
    pub backend_unit: CountPair,
    pub backend_integration: CountPair,
    pub frontend_unit: CountPair,
    pub e2e: CountPair,
    pub sql_injection: CountPair,
    pub auth: CountPair,
    pub xss: CountPair,
    pub secrets_scan: SecretsScanResult,
    pub eslint_errors: u32,
    pub type_errors: u32,
    pub test_coverage: f64,
    pub duplicate_code: f64,
    pub bundle_size: f64,
    pub response_time: f64,
    pub memory_usage: f64,
    pub lighthouse_score: f64,
}

pub const FALLBACK: FallbackTable = FallbackTable {
    backend_unit: CountPair::new(5, 17),
    backend_integration: CountPair::new(6, 9),
    frontend_unit: CountPair::new(4, 6),
    e2e: CountPair::new(0, 2),
    sql_injection: CountPair::new(0, 2),
    auth: CountPair::new(2, 9),
    xss: CountPair::new(0, 2),
    secrets_scan: SecretsScanResult {
        issues_fixed: 0,
        total_issues: SECRETS_TOTAL_ISSUES,
    },
    eslint_errors: 2,
    type_errors: 1,
    test_coverage: 71.0,
    duplicate_code: 18.0,
    bundle_size: 174.0,
    response_time: 850.0,
    memory_usage: 145.0,
    lighthouse_score: 55.0,
};
