use std::fmt::Write;

use crate::config::{RECOMMENDATION_THRESHOLD, REGRESSION_PENALTY};
use crate::record::ScoreRecord;
use crate::results::CountPair;
use crate::scoring::{calculate_score, ScoreBreakdown};

const SECURITY_ADVICE: &[&str] = &[
    "**High priority:** fix SQL injection vulnerabilities and validate input",
    "Remove hardcoded secrets and read them from the environment",
    "Add authentication and authorization checks to protected routes",
];
const PERFORMANCE_ADVICE: &[&str] = &[
    "Batch database queries to avoid N+1 access patterns",
    "Fix memory leaks in React components",
    "Replace quadratic algorithms with O(n log n) ones",
];
const QUALITY_ADVICE: &[&str] = &[
    "Extract duplicated code into shared functions",
    "Handle errors in every async operation",
    "Replace `any` with real TypeScript types",
];
const LOGIC_ADVICE: &[&str] = &[
    "Fix off-by-one errors in pagination",
    "Handle edge cases such as empty arrays and zero quantities",
    "Fix race conditions in concurrent operations",
];
const NO_ISSUES_ADVICE: &[&str] = &[
    "Great work! Keep watching for regressions",
    "Consider performance work for larger data sets",
];

/// Render a score record as a Markdown report.
pub fn render_markdown(record: &ScoreRecord) -> String {
    let score = &record.score;
    let results = &record.results;
    let baseline = &record.baseline;
    let mut md = String::new();

    let _ = writeln!(md, "# Coding Agent Benchmark Report\n");
    let _ = writeln!(
        md,
        "**Generated:** {}\n",
        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(md, "## Overall Score: {:.2}/100\n", score.total);

    let _ = writeln!(md, "### Score Breakdown\n");
    let _ = writeln!(md, "| Category | Score | Weight | Weighted Score |");
    let _ = writeln!(md, "|----------|-------|--------|----------------|");
    for (name, value, weight) in score.weighted_categories() {
        let _ = writeln!(
            md,
            "| {} | {:.2}/100 | {:.1}x | {:.2} |",
            name,
            value,
            weight,
            value * weight
        );
    }
    md.push('\n');

    if score.regressions > 0 {
        let _ = writeln!(
            md,
            "> **Regressions detected:** {} tests that passed in the baseline now fail (-{} points)\n",
            score.regressions,
            score.regressions as f64 * REGRESSION_PENALTY
        );
    }

    let security = &results.security;
    let secrets = CountPair {
        passed: security.secrets_scan.issues_fixed,
        total: security.secrets_scan.total_issues,
    };
    let _ = writeln!(md, "## Security ({:.2}/100)\n", score.security);
    tally_table(
        &mut md,
        "Test Category",
        &[
            ("SQL Injection Prevention", security.sql_injection_tests),
            ("XSS Prevention", security.xss_tests),
            ("Authentication & Authorization", security.auth_tests),
            ("Secrets Management", secrets),
        ],
    );

    let (now, before) = (&results.performance, &baseline.performance);
    let _ = writeln!(md, "## Performance ({:.2}/100)\n", score.performance);
    let _ = writeln!(md, "| Metric | Current | Baseline | Change |");
    let _ = writeln!(md, "|--------|---------|----------|--------|");
    for (name, unit, current, base) in [
        ("Response Time", "ms", now.response_time, before.response_time),
        ("Memory Usage", "MB", now.memory_usage, before.memory_usage),
        ("Bundle Size", "KB", now.bundle_size, before.bundle_size),
    ] {
        let _ = writeln!(
            md,
            "| {} | {}{} | {}{} | {} |",
            name,
            current,
            unit,
            base,
            unit,
            relative_change(current, base)
        );
    }
    let _ = writeln!(
        md,
        "| Lighthouse Score | {} | {} | {:+.0} |\n",
        now.lighthouse_score,
        before.lighthouse_score,
        now.lighthouse_score - before.lighthouse_score
    );

    let (now, before) = (&results.quality, &baseline.quality);
    let _ = writeln!(md, "## Code Quality ({:.2}/100)\n", score.quality);
    let _ = writeln!(md, "| Metric | Current | Baseline | Change |");
    let _ = writeln!(md, "|--------|---------|----------|--------|");
    let _ = writeln!(
        md,
        "| ESLint Errors | {} | {} | {:+} |",
        now.eslint_errors,
        before.eslint_errors,
        now.eslint_errors as i64 - before.eslint_errors as i64
    );
    let _ = writeln!(
        md,
        "| Type Errors | {} | {} | {:+} |",
        now.type_errors,
        before.type_errors,
        now.type_errors as i64 - before.type_errors as i64
    );
    let _ = writeln!(
        md,
        "| Test Coverage | {}% | {}% | {:+.1}% |",
        now.test_coverage,
        before.test_coverage,
        now.test_coverage - before.test_coverage
    );
    let _ = writeln!(
        md,
        "| Code Duplication | {}% | {}% | {:+.1}% |\n",
        now.duplicate_code,
        before.duplicate_code,
        now.duplicate_code - before.duplicate_code
    );

    let logic = &results.logic;
    let _ = writeln!(md, "## Business Logic ({:.2}/100)\n", score.logic);
    tally_table(
        &mut md,
        "Test Suite",
        &[
            ("Unit Tests", logic.unit_tests),
            ("Integration Tests", logic.integration_tests),
            ("E2E Tests", logic.e2e_tests),
        ],
    );

    // A record written by hand may carry a baseline the calculator can't score
    let baseline_total =
        (!baseline.has_empty_tally()).then(|| calculate_score(baseline, baseline).total);
    let _ = writeln!(md, "## Score Comparison\n");
    let _ = writeln!(md, "```");
    match baseline_total {
        Some(baseline_total) => {
            let _ = writeln!(md, "Baseline Score: {:.2}/100", baseline_total);
            let _ = writeln!(md, "Current Score:  {:.2}/100", score.total);
            let _ = writeln!(
                md,
                "Improvement:    {:+.2} points",
                score.total - baseline_total
            );
        }
        None => {
            let _ = writeln!(md, "Baseline Score: n/a");
            let _ = writeln!(md, "Current Score:  {:.2}/100", score.total);
            let _ = writeln!(md, "Improvement:    n/a");
        }
    }
    let _ = writeln!(md, "```\n");

    let _ = writeln!(md, "## Next Steps\n");
    for line in recommendations(score) {
        let _ = writeln!(md, "- {}", line);
    }

    md
}

fn tally_table(md: &mut String, heading: &str, rows: &[(&str, CountPair)]) {
    let _ = writeln!(md, "| {} | Passed | Total | Pass Rate |", heading);
    let _ = writeln!(md, "|------|--------|-------|-----------|");
    for (name, tally) in rows {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            name,
            tally.passed,
            tally.total,
            pass_rate(*tally)
        );
    }
    md.push('\n');
}

fn pass_rate(tally: CountPair) -> String {
    match tally.percent() {
        Some(pct) => format!("{:.1}%", pct),
        None => "n/a".to_string(),
    }
}

fn relative_change(current: f64, baseline: f64) -> String {
    if baseline == 0.0 {
        return "n/a".to_string();
    }
    format!("{:+.1}%", (current - baseline) / baseline * 100.0)
}

/// Advice for every category below the threshold, security first.
pub fn recommendations(score: &ScoreBreakdown) -> Vec<&'static str> {
    let mut advice: Vec<&'static str> = [
        (score.security, SECURITY_ADVICE),
        (score.performance, PERFORMANCE_ADVICE),
        (score.quality, QUALITY_ADVICE),
        (score.logic, LOGIC_ADVICE),
    ]
    .into_iter()
    .filter(|(value, _)| *value < RECOMMENDATION_THRESHOLD)
    .flat_map(|(_, lines)| lines.iter().copied())
    .collect();

    if advice.is_empty() {
        advice.extend_from_slice(NO_ISSUES_ADVICE);
    }
    advice
}
