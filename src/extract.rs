//! Pulls structured reports out of raw checker output.
//!
//! Checkers routinely print banners, deprecation warnings, or progress lines
//! before their JSON, and sometimes trailing noise after it. Everything here
//! treats "could not find or parse a report" as an ordinary `None`.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::results::CountPair;

/// Object-start prefixes of the jest/vitest `--json` summaries.
pub const REPORT_MARKERS: &[&str] = &["{\"num", "{\"testResults"];

static TYPE_ERROR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"error TS\d+").unwrap());

static TSC_DIAGNOSTICS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Files:\s+\d+").unwrap());

// ============================================================================
// Generic extraction
// ============================================================================

/// Parse the first JSON value starting at the earliest of `markers`.
///
/// Only one value is read, so anything the tool prints after its report is
/// ignored.
pub fn extract_value_at<T: DeserializeOwned>(raw: &str, markers: &[&str]) -> Option<T> {
    let start = markers.iter().filter_map(|m| raw.find(m)).min()?;
    let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<T>();
    stream.next()?.ok()
}

/// Find and parse an embedded jest/vitest summary.
pub fn extract_json(raw: &str) -> Option<serde_json::Value> {
    extract_value_at(raw, REPORT_MARKERS)
}

// ============================================================================
// jest / vitest
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    #[serde(default)]
    pub num_passed_tests: u32,
    #[serde(default)]
    pub num_total_tests: u32,
    #[serde(default)]
    pub test_results: Vec<SuiteReport>,
}

/// One test file. The formatted `--json` output names its cases
/// `assertionResults`; the raw aggregated form uses `testResults`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    #[serde(default)]
    pub assertion_results: Option<Vec<RawCase>>,
    #[serde(default)]
    pub test_results: Option<Vec<RawCase>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCase {
    #[serde(default)]
    pub ancestor_titles: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub status: String,
}

/// One reported test outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub ancestor_titles: Vec<String>,
    pub title: String,
    pub full_name: String,
    pub status: String,
}

impl TestCaseResult {
    pub fn passed(&self) -> bool {
        self.status == "passed"
    }
}

impl From<RawCase> for TestCaseResult {
    fn from(raw: RawCase) -> Self {
        let full_name = match raw.full_name {
            Some(name) if !name.is_empty() => name,
            _ => raw
                .ancestor_titles
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(raw.title.as_str()))
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        };
        TestCaseResult {
            ancestor_titles: raw.ancestor_titles,
            title: raw.title,
            full_name,
            status: raw.status,
        }
    }
}

impl TestReport {
    pub fn counts(&self) -> CountPair {
        // Some reporters count todo/skipped cases oddly; never let passed exceed total.
        CountPair {
            passed: self.num_passed_tests.min(self.num_total_tests),
            total: self.num_total_tests,
        }
    }
}

/// Find and parse a jest/vitest summary into its typed form.
pub fn parse_test_report(raw: &str) -> Option<TestReport> {
    serde_json::from_value(extract_json(raw)?).ok()
}

/// Flatten a report's suites into individual cases. No report, no cases.
pub fn extract_test_cases(report: Option<&TestReport>) -> Vec<TestCaseResult> {
    let Some(report) = report else {
        return Vec::new();
    };

    report
        .test_results
        .iter()
        .flat_map(|suite| {
            let assertions = suite.assertion_results.iter().flatten();
            let legacy = suite.test_results.iter().flatten();
            assertions.chain(legacy)
        })
        .cloned()
        .map(TestCaseResult::from)
        .collect()
}

// ============================================================================
// playwright
// ============================================================================

#[derive(Debug, Deserialize)]
struct PlaywrightReport {
    stats: Option<PlaywrightStats>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaywrightStats {
    #[serde(default)]
    expected: u32,
    #[serde(default)]
    unexpected: u32,
    #[serde(default)]
    skipped: u32,
}

/// Pass/total from the playwright JSON reporter. Expected outcomes count as
/// passes; unexpected and skipped count against the total.
pub fn parse_playwright_counts(raw: &str) -> Option<CountPair> {
    let report: PlaywrightReport = extract_value_at(raw, &["{"])?;
    let stats = report.stats?;
    Some(CountPair {
        passed: stats.expected,
        total: stats.expected + stats.unexpected + stats.skipped,
    })
}

// ============================================================================
// eslint / tsc
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintFileReport {
    #[serde(default)]
    error_count: u32,
}

/// Total `errorCount` across an eslint `-f json` report.
pub fn parse_eslint_errors(raw: &str) -> Option<u32> {
    let files: Vec<EslintFileReport> = extract_value_at(raw, &["["])?;
    Some(files.iter().map(|f| f.error_count).sum())
}

/// Type errors in `tsc --pretty false` output, or `None` when the output shows
/// no sign that tsc actually ran (no diagnostics block and no errors).
pub fn parse_type_errors(raw: &str) -> Option<u32> {
    let errors = TYPE_ERROR_PATTERN.find_iter(raw).count() as u32;
    if errors == 0 && !TSC_DIAGNOSTICS_PATTERN.is_match(raw) {
        return None;
    }
    Some(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_skips_leading_warning() {
        let raw = "warning: foo\n{\"numPassedTests\":3,\"numTotalTests\":5}";
        let value = extract_json(raw).unwrap();
        assert_eq!(value, json!({"numPassedTests": 3, "numTotalTests": 5}));
    }

    #[test]
    fn test_extract_ignores_trailing_noise() {
        let raw = "{\"numPassedTests\":1,\"numTotalTests\":1}\nForce exiting Jest\n";
        let report = parse_test_report(raw).unwrap();
        assert_eq!(report.counts(), CountPair::new(1, 1));
    }

    #[test]
    fn test_extract_accepts_test_results_marker() {
        let raw = "> vitest\n{\"testResults\":[],\"numTotalTests\":0}";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["numTotalTests"], 0);
    }

    #[test]
    fn test_extract_without_marker_is_none() {
        assert!(extract_json("").is_none());
        assert!(extract_json("Error: Cannot find module 'jest'").is_none());
        assert!(extract_json("{\"other\": 1}").is_none());
    }

    #[test]
    fn test_extract_truncated_payload_is_none() {
        assert!(extract_json("{\"numPassedTests\":3,\"numTot").is_none());
    }

    #[test]
    fn test_cases_from_assertion_results() {
        let raw = json!({
            "numPassedTests": 1,
            "numTotalTests": 2,
            "testResults": [{
                "assertionResults": [
                    {
                        "ancestorTitles": ["Security", "Search"],
                        "title": "should prevent SQL injection in search",
                        "fullName": "Security Search should prevent SQL injection in search",
                        "status": "passed"
                    },
                    {
                        "ancestorTitles": ["Cart"],
                        "title": "should require authentication",
                        "status": "failed"
                    }
                ]
            }]
        })
        .to_string();

        let report = parse_test_report(&raw);
        let cases = extract_test_cases(report.as_ref());
        assert_eq!(cases.len(), 2);
        assert_eq!(
            cases[0].full_name,
            "Security Search should prevent SQL injection in search"
        );
        assert!(cases[0].passed());
        // fullName derived from ancestors + title when missing
        assert_eq!(cases[1].full_name, "Cart should require authentication");
        assert!(!cases[1].passed());
    }

    #[test]
    fn test_cases_from_legacy_test_results() {
        let raw = r#"{"numTotalTests":1,"testResults":[{"testResults":[{"title":"renders","fullName":"Card renders","status":"passed","ancestorTitles":["Card"]}]}]}"#;
        let cases = extract_test_cases(parse_test_report(raw).as_ref());
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].full_name, "Card renders");
    }

    #[test]
    fn test_cases_from_absent_report_is_empty() {
        assert!(extract_test_cases(None).is_empty());
    }

    #[test]
    fn test_playwright_counts() {
        let raw = json!({
            "config": {},
            "suites": [],
            "stats": {"expected": 1, "unexpected": 1, "skipped": 1, "flaky": 0}
        })
        .to_string();
        assert_eq!(parse_playwright_counts(&raw), Some(CountPair::new(1, 3)));
    }

    #[test]
    fn test_playwright_without_stats_is_none() {
        assert!(parse_playwright_counts("{\"config\": {}}").is_none());
        assert!(parse_playwright_counts("Error: No tests found").is_none());
    }

    #[test]
    fn test_eslint_errors_summed() {
        let raw = "[{\"filePath\":\"a.ts\",\"errorCount\":2,\"warningCount\":1},{\"filePath\":\"b.tsx\",\"errorCount\":3}]";
        assert_eq!(parse_eslint_errors(raw), Some(5));
        assert_eq!(parse_eslint_errors("[]"), Some(0));
        assert_eq!(parse_eslint_errors("Oops! Something went wrong!"), None);
    }

    #[test]
    fn test_type_errors_counted() {
        let raw = "src/a.ts(3,7): error TS2322: Type 'string' is not assignable.\n\
                   src/b.ts(9,1): error TS7006: Parameter 'x' implicitly has an 'any' type.\n";
        assert_eq!(parse_type_errors(raw), Some(2));
    }

    #[test]
    fn test_clean_type_check_reports_zero() {
        let raw = "Files:            112\nLines:          40211\nCheck time:     1.02s\n";
        assert_eq!(parse_type_errors(raw), Some(0));
    }

    #[test]
    fn test_silent_type_check_is_none() {
        assert_eq!(parse_type_errors(""), None);
        assert_eq!(parse_type_errors("npm ERR! could not determine executable"), None);
    }
}
