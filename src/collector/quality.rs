use std::path::Path;
use tracing::{debug, info};

use super::{Collector, FALLBACK};
use crate::collection_log::{CollectionLog, Domain};
use crate::config::{ESLINT_ARGS, JEST_COVERAGE_ARGS, TSC_BACKEND_ARGS, TSC_FRONTEND_ARGS};
use crate::extract::{parse_eslint_errors, parse_type_errors};
use crate::process::CheckRunner;
use crate::results::QualityMetrics;

/// Line coverage from an istanbul `json-summary`, rounded to a whole percent.
///
/// Istanbul writes `"pct": "Unknown"` when nothing was instrumented; that
/// reads as no data.
pub fn read_coverage_pct(path: &Path) -> Option<f64> {
    let content = std::fs::read_to_string(path).ok()?;
    let summary: serde_json::Value = serde_json::from_str(&content).ok()?;
    summary
        .pointer("/total/lines/pct")
        .and_then(serde_json::Value::as_f64)
        .map(f64::round)
}

impl<R: CheckRunner> Collector<R> {
    pub(super) async fn collect_quality(&self, log: &mut CollectionLog) -> QualityMetrics {
        let root = self.layout.root().to_path_buf();

        info!("Running eslint");
        let eslint_out = self.npx(ESLINT_ARGS, &root).await;
        let eslint_errors = match parse_eslint_errors(&eslint_out) {
            Some(errors) => {
                log.measured(Domain::Quality, format!("eslint: {} errors", errors));
                errors
            }
            None => {
                log.fallback(
                    Domain::Quality,
                    format!(
                        "eslint: no JSON report, using baseline {}",
                        FALLBACK.eslint_errors
                    ),
                );
                FALLBACK.eslint_errors
            }
        };

        info!("Running type checks");
        let backend_out = self.npx(TSC_BACKEND_ARGS, &root).await;
        let frontend_out = self.npx(TSC_FRONTEND_ARGS, &root).await;
        let type_errors = match (parse_type_errors(&backend_out), parse_type_errors(&frontend_out)) {
            (None, None) => {
                log.fallback(
                    Domain::Quality,
                    format!(
                        "tsc: neither project reported, using baseline {}",
                        FALLBACK.type_errors
                    ),
                );
                FALLBACK.type_errors
            }
            (backend, frontend) => {
                let errors = backend.unwrap_or(0) + frontend.unwrap_or(0);
                log.measured(Domain::Quality, format!("tsc: {} errors", errors));
                errors
            }
        };

        // The coverage run's stdout is irrelevant; the summary file is the result
        info!("Running backend coverage");
        let backend_dir = self.layout.backend_dir();
        let coverage_out = self.npx(JEST_COVERAGE_ARGS, &backend_dir).await;
        debug!("Coverage run printed {} bytes", coverage_out.len());
        let summary_path = self.layout.coverage_summary();
        let test_coverage = match read_coverage_pct(&summary_path) {
            Some(pct) => {
                log.measured(Domain::Quality, format!("coverage: {}% of lines", pct));
                pct
            }
            None => {
                log.fallback(
                    Domain::Quality,
                    format!(
                        "coverage: no usable summary at {:?}, using baseline {}%",
                        summary_path, FALLBACK.test_coverage
                    ),
                );
                FALLBACK.test_coverage
            }
        };

        log.fallback(
            Domain::Quality,
            format!(
                "duplication: not measured, using baseline {}%",
                FALLBACK.duplicate_code
            ),
        );

        QualityMetrics {
            eslint_errors,
            type_errors,
            test_coverage,
            duplicate_code: FALLBACK.duplicate_code,
        }
    }
}
