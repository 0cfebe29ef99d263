use std::path::Path;
use tracing::info;

use super::{resolve_logged, Collector, FrontendRun, FALLBACK};
use crate::classify::{Bucket, FRONTEND_RULES, SECURITY_RULES};
use crate::collection_log::{CollectionLog, Domain};
use crate::config::{HARDCODED_SECRET_MARKERS, JEST_SECURITY_ARGS, SECRETS_TOTAL_ISSUES};
use crate::extract::{extract_test_cases, parse_test_report};
use crate::process::CheckRunner;
use crate::results::{SecretsScanResult, SecurityResults};

/// Score a config file's text: any known hardcoded secret means none of the
/// known issues are fixed, none means all of them are.
pub fn scan_secrets_text(content: &str) -> SecretsScanResult {
    let hardcoded = HARDCODED_SECRET_MARKERS
        .iter()
        .any(|marker| content.contains(marker));
    SecretsScanResult {
        issues_fixed: if hardcoded { 0 } else { SECRETS_TOTAL_ISSUES },
        total_issues: SECRETS_TOTAL_ISSUES,
    }
}

pub fn scan_secrets_file(path: &Path) -> std::io::Result<SecretsScanResult> {
    let content = std::fs::read_to_string(path)?;
    Ok(scan_secrets_text(&content))
}

impl<R: CheckRunner> Collector<R> {
    pub(super) async fn collect_security(
        &self,
        frontend: Option<&FrontendRun>,
        log: &mut CollectionLog,
    ) -> SecurityResults {
        info!("Running backend security suite");
        let out = self
            .npx(JEST_SECURITY_ARGS, &self.layout.backend_dir())
            .await;
        let cases = extract_test_cases(parse_test_report(&out).as_ref());
        let partition = SECURITY_RULES.partition(&cases);

        let sql_injection_tests = resolve_logged(
            log,
            Domain::Security,
            "sql injection",
            partition.tally(Bucket::SqlInjection),
            FALLBACK.sql_injection,
        );
        let auth_tests = resolve_logged(
            log,
            Domain::Security,
            "auth",
            partition.tally(Bucket::Auth),
            FALLBACK.auth,
        );

        // XSS coverage lives in the frontend suite that already ran
        let xss_measured =
            frontend.and_then(|run| FRONTEND_RULES.partition(&run.cases).tally(Bucket::Xss));
        let xss_tests = resolve_logged(log, Domain::Security, "xss", xss_measured, FALLBACK.xss);

        let secrets_path = self.layout.secrets_file();
        let secrets_scan = match scan_secrets_file(&secrets_path) {
            Ok(scan) => {
                log.measured(
                    Domain::Security,
                    format!(
                        "secrets: {}/{} issues fixed",
                        scan.issues_fixed, scan.total_issues
                    ),
                );
                scan
            }
            Err(e) => {
                log.fallback(
                    Domain::Security,
                    format!("secrets: failed to read {:?}: {}", secrets_path, e),
                );
                FALLBACK.secrets_scan
            }
        };

        SecurityResults {
            sql_injection_tests,
            xss_tests,
            auth_tests,
            secrets_scan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardcoded_secret_means_nothing_fixed() {
        let scan = scan_secrets_text("export const JWT_SECRET = 'super-secret-key';");
        assert_eq!(scan.issues_fixed, 0);
        assert_eq!(scan.total_issues, 6);

        let scan = scan_secrets_text("const stripe = 'sk_live_abc123';");
        assert_eq!(scan.issues_fixed, 0);
    }

    #[test]
    fn test_env_based_config_is_fully_fixed() {
        let scan = scan_secrets_text("export const JWT_SECRET = process.env.JWT_SECRET;");
        assert_eq!(scan.issues_fixed, 6);
        assert_eq!(scan.total_issues, 6);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(scan_secrets_file(Path::new("/nonexistent/secrets.ts")).is_err());
    }
}
