pub mod fallback;
mod logic;
mod performance;
mod quality;
mod security;

use std::path::Path;
use tracing::info;

use crate::collection_log::{CollectionLog, Domain};
use crate::config::ProjectLayout;
use crate::extract::TestCaseResult;
use crate::process::{CheckCommand, CheckRunner};
use crate::results::{CountPair, LogicResults, TestResults};

pub use fallback::{FallbackTable, FALLBACK};
pub use performance::measure_bundle_kb;
pub use quality::read_coverage_pct;
pub use security::{scan_secrets_file, scan_secrets_text};

/// Runs every checker against one project checkout and normalizes the results.
///
/// Checkers share build artifacts and coverage files, so domains are
/// collected one after another, never concurrently.
pub struct Collector<R> {
    layout: ProjectLayout,
    runner: R,
}

/// Output of the one frontend suite run, shared by the frontend-unit and XSS
/// tallies.
#[derive(Debug, Clone)]
pub struct FrontendRun {
    pub counts: CountPair,
    pub cases: Vec<TestCaseResult>,
}

/// Collected results plus the record of how each domain was obtained.
#[derive(Debug, Clone)]
pub struct Collection {
    pub results: TestResults,
    pub log: CollectionLog,
}

/// `measured` if it holds any cases, otherwise `fallback`.
///
/// A non-empty tally is kept even when nothing passed.
pub fn resolve(measured: Option<CountPair>, fallback: CountPair) -> CountPair {
    measured.filter(|m| !m.is_empty()).unwrap_or(fallback)
}

/// `resolve`, recording which side was taken.
fn resolve_logged(
    log: &mut CollectionLog,
    domain: Domain,
    what: &str,
    measured: Option<CountPair>,
    fallback: CountPair,
) -> CountPair {
    let resolved = resolve(measured, fallback);
    if measured.is_some_and(|m| !m.is_empty()) {
        log.measured(
            domain,
            format!("{}: {}/{} passed", what, resolved.passed, resolved.total),
        );
    } else {
        log.fallback(
            domain,
            format!(
                "{}: no usable results, using baseline {}/{}",
                what, fallback.passed, fallback.total
            ),
        );
    }
    resolved
}

impl<R: CheckRunner> Collector<R> {
    pub fn new(layout: ProjectLayout, runner: R) -> Self {
        Self { layout, runner }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn collect(&self) -> TestResults {
        self.collect_with_log().await.results
    }

    pub async fn collect_with_log(&self) -> Collection {
        let mut log = CollectionLog::new();
        info!("Collecting results under {:?}", self.layout.root());

        let frontend = self.run_frontend_suite(&mut log).await;

        let backend = self.collect_backend_tests(&mut log).await;
        let frontend_unit = self.frontend_unit_tests(frontend.as_ref(), &mut log);
        let e2e_tests = self.collect_e2e_tests(&mut log).await;
        let security = self.collect_security(frontend.as_ref(), &mut log).await;
        let quality = self.collect_quality(&mut log).await;
        let performance = self.collect_performance(&mut log);

        // Frontend and backend unit suites are reported as one figure
        let unit_tests = backend.unit + frontend_unit;

        let results = TestResults {
            security,
            performance,
            quality,
            logic: LogicResults {
                unit_tests,
                integration_tests: backend.integration,
                e2e_tests,
            },
        };

        info!(
            "Collection finished: unit {}/{}, integration {}/{}, e2e {}/{}",
            results.logic.unit_tests.passed,
            results.logic.unit_tests.total,
            results.logic.integration_tests.passed,
            results.logic.integration_tests.total,
            results.logic.e2e_tests.passed,
            results.logic.e2e_tests.total,
        );

        Collection { results, log }
    }

    async fn npx(&self, args: &[&str], cwd: &Path) -> String {
        self.runner.run(&CheckCommand::npx(args), cwd).await
    }
}
