use codebench_scorer::results::{CountPair, SecretsScanResult, TestResults};
use codebench_scorer::scoring::{calculate_score, count_regressions};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {} to be close to {}",
        actual,
        expected
    );
}

#[test]
fn test_reference_logic_score() {
    let baseline = TestResults::reference_baseline();
    let score = calculate_score(&baseline, &baseline);
    // 40*9/23 + 35*6/9 + 25*0/2
    assert_close(score.logic, 38.9855);
}

#[test]
fn test_reference_security_score() {
    let baseline = TestResults::reference_baseline();
    let score = calculate_score(&baseline, &baseline);
    // Only auth contributes: 25*2/9
    assert_close(score.security, 5.5556);
    assert_eq!(format!("{:.2}", score.security), "5.56");
}

#[test]
fn test_baseline_against_itself() {
    let baseline = TestResults::reference_baseline();
    let score = calculate_score(&baseline, &baseline);
    assert_eq!(score.regressions, 0);
    assert_close(score.performance, 88.75);
    assert_close(score.quality, 33.6);
    assert_close(
        score.total,
        (3.0 * score.security + 2.0 * score.performance + 1.5 * score.quality + 2.5 * score.logic)
            / 9.0,
    );
}

#[test]
fn test_calculation_is_idempotent() {
    let baseline = TestResults::reference_baseline();
    let mut results = baseline.clone();
    results.security.sql_injection_tests = CountPair::new(5, 8);
    results.quality.test_coverage = 84.0;

    let first = calculate_score(&results, &baseline);
    let second = calculate_score(&results, &baseline);
    assert_eq!(first, second);
}

#[test]
fn test_perfect_run_scores_full_marks() {
    let baseline = TestResults::reference_baseline();
    let mut results = baseline.clone();
    results.security.sql_injection_tests = CountPair::new(8, 8);
    results.security.xss_tests = CountPair::new(5, 5);
    results.security.auth_tests = CountPair::new(9, 9);
    results.security.secrets_scan = SecretsScanResult {
        issues_fixed: 6,
        total_issues: 6,
    };
    results.performance.response_time = 120.0;
    results.performance.memory_usage = 60.0;
    results.performance.bundle_size = 90.0;
    results.performance.lighthouse_score = 100.0;
    results.quality.eslint_errors = 0;
    results.quality.type_errors = 0;
    results.quality.test_coverage = 100.0;
    results.quality.duplicate_code = 0.0;
    results.logic.unit_tests = CountPair::new(23, 23);
    results.logic.integration_tests = CountPair::new(9, 9);
    results.logic.e2e_tests = CountPair::new(2, 2);

    let score = calculate_score(&results, &baseline);
    assert_close(score.security, 100.0);
    assert_close(score.performance, 100.0);
    assert_close(score.quality, 100.0);
    assert_close(score.logic, 100.0);
    assert_close(score.total, 100.0);
}

#[test]
fn test_each_regression_costs_five_points() {
    let results = TestResults::reference_baseline();
    let unchanged = calculate_score(&results, &results);

    for k in 1..=3 {
        let mut baseline = results.clone();
        baseline.logic.unit_tests = CountPair::new(9 + k, 23);
        let score = calculate_score(&results, &baseline);
        assert_eq!(score.regressions, unchanged.regressions + k);
        assert_close(score.total, unchanged.total - 5.0 * k as f64);
    }
}

#[test]
fn test_total_is_floored_at_zero() {
    let results = TestResults::reference_baseline();
    let mut baseline = results.clone();
    baseline.logic.unit_tests = CountPair::new(23, 23);
    baseline.logic.integration_tests = CountPair::new(9, 9);
    baseline.logic.e2e_tests = CountPair::new(2, 2);

    let score = calculate_score(&results, &baseline);
    assert_eq!(score.regressions, 14 + 3 + 2);
    assert_eq!(score.total, 0.0);
}

#[test]
fn test_regressions_only_count_lost_passes() {
    let baseline = TestResults::reference_baseline().logic;
    let mut current = baseline.clone();
    current.unit_tests = CountPair::new(15, 30);
    current.e2e_tests = CountPair::new(2, 2);
    assert_eq!(count_regressions(&current, &baseline), 0);

    current.integration_tests = CountPair::new(1, 9);
    assert_eq!(count_regressions(&current, &baseline), 5);
}

#[test]
fn test_clean_eslint_baseline_does_not_divide_by_zero() {
    let mut baseline = TestResults::reference_baseline();
    baseline.quality.eslint_errors = 0;

    let mut results = baseline.clone();
    let clean = calculate_score(&results, &baseline);
    assert!(clean.quality.is_finite());
    // full 30 for eslint, nothing for type errors, plus coverage and duplication
    assert_close(clean.quality, 63.6);

    results.quality.eslint_errors = 3;
    let dirty = calculate_score(&results, &baseline);
    assert!(dirty.quality.is_finite());
    assert_close(dirty.quality, 33.6);
}

#[test]
fn test_more_errors_than_baseline_scores_zero_not_negative() {
    let baseline = TestResults::reference_baseline();
    let mut results = baseline.clone();
    results.quality.eslint_errors = 40;
    results.quality.type_errors = 12;
    let score = calculate_score(&results, &baseline);
    assert_close(score.quality, 33.6);
}

#[test]
#[should_panic(expected = "empty tally")]
fn test_empty_tally_is_a_contract_violation() {
    let baseline = TestResults::reference_baseline();
    let mut results = baseline.clone();
    results.logic.e2e_tests = CountPair::default();
    calculate_score(&results, &baseline);
}
