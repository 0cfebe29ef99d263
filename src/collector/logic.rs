use tracing::info;

use super::{resolve_logged, Collector, FrontendRun, FALLBACK};
use crate::collection_log::{CollectionLog, Domain};
use crate::config::{JEST_INTEGRATION_ARGS, JEST_UNIT_ARGS, PLAYWRIGHT_ARGS, VITEST_ARGS};
use crate::extract::{extract_test_cases, parse_playwright_counts, parse_test_report};
use crate::process::CheckRunner;
use crate::results::CountPair;

pub(super) struct BackendTests {
    pub unit: CountPair,
    pub integration: CountPair,
}

impl<R: CheckRunner> Collector<R> {
    /// Run vitest once. Kept only when it reported at least one test.
    pub(super) async fn run_frontend_suite(&self, log: &mut CollectionLog) -> Option<FrontendRun> {
        info!("Running frontend unit suite");
        let out = self.npx(VITEST_ARGS, &self.layout.frontend_dir()).await;

        let Some(report) = parse_test_report(&out) else {
            log.fallback(Domain::FrontendUnit, "vitest: no JSON report in output");
            return None;
        };

        let counts = report.counts();
        if counts.is_empty() {
            log.fallback(Domain::FrontendUnit, "vitest: report contained no tests");
            return None;
        }

        let cases = extract_test_cases(Some(&report));
        Some(FrontendRun { counts, cases })
    }

    pub(super) async fn collect_backend_tests(&self, log: &mut CollectionLog) -> BackendTests {
        let backend_dir = self.layout.backend_dir();

        info!("Running backend unit tests");
        let unit_out = self.npx(JEST_UNIT_ARGS, &backend_dir).await;
        let unit = resolve_logged(
            log,
            Domain::BackendUnit,
            "jest tests/unit",
            parse_test_report(&unit_out).map(|r| r.counts()),
            FALLBACK.backend_unit,
        );

        info!("Running backend integration tests");
        let integration_out = self.npx(JEST_INTEGRATION_ARGS, &backend_dir).await;
        let integration = resolve_logged(
            log,
            Domain::BackendIntegration,
            "jest tests/integration",
            parse_test_report(&integration_out).map(|r| r.counts()),
            FALLBACK.backend_integration,
        );

        BackendTests { unit, integration }
    }

    pub(super) fn frontend_unit_tests(
        &self,
        frontend: Option<&FrontendRun>,
        log: &mut CollectionLog,
    ) -> CountPair {
        resolve_logged(
            log,
            Domain::FrontendUnit,
            "vitest",
            frontend.map(|run| run.counts),
            FALLBACK.frontend_unit,
        )
    }

    /// Playwright needs the app servers running; without them this falls back.
    pub(super) async fn collect_e2e_tests(&self, log: &mut CollectionLog) -> CountPair {
        info!("Running end-to-end tests");
        let out = self.npx(PLAYWRIGHT_ARGS, &self.layout.frontend_dir()).await;
        resolve_logged(
            log,
            Domain::EndToEnd,
            "playwright",
            parse_playwright_counts(&out),
            FALLBACK.e2e,
        )
    }
}
