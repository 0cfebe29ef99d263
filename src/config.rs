use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Codebench Scorer: runs the benchmark's checkers and scores the result.
#[derive(Parser, Debug, Clone)]
#[command(name = "codebench-scorer")]
pub struct CliArgs {
    /// What to do: collect and score, render a report, or print a baseline snapshot
    #[arg(value_enum, default_value_t = Mode::Calculate)]
    pub mode: Mode,

    /// Benchmark project root (contains packages/backend and packages/frontend)
    #[arg(short = 'r', long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Baseline snapshot JSON; defaults to the built-in reference baseline
    #[arg(short = 'b', long = "baseline")]
    pub baseline: Option<PathBuf>,

    /// Timeout for each external checker invocation
    #[arg(short = 't', long = "timeout-secs", default_value_t = DEFAULT_COMMAND_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Score record path (default: <root>/score-results.json)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Markdown report path (default: <root>/benchmark-report.md)
    #[arg(long = "report-file")]
    pub report_file: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Calculate,
    Report,
    Baseline,
}

pub struct ScorerConfig {
    pub mode: Mode,
    pub layout: ProjectLayout,
    pub baseline_path: Option<PathBuf>,
    pub command_timeout: Duration,
    pub output_path: PathBuf,
    pub report_path: PathBuf,
    pub log_file: Option<PathBuf>,
}

/// Where the measured project keeps the things the collector reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
}

// Output file names
pub const SCORE_RESULTS_FILE: &str = "score-results.json";
pub const REPORT_FILE: &str = "benchmark-report.md";

// Process constants
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 120;
pub const OUTPUT_DRAIN_GRACE_MS: u64 = 500;
/// Bound on reading leftover output once a checker has exited; a lingering
/// worker process can hold the pipe open indefinitely.
pub const OUTPUT_DRAIN_AFTER_EXIT_MS: u64 = 2_000;

// Checker command lines (all launched through npx)
pub const JEST_UNIT_ARGS: &[&str] = &["jest", "tests/unit", "--json", "--forceExit", "--no-coverage"];
pub const JEST_INTEGRATION_ARGS: &[&str] = &[
    "jest",
    "tests/integration",
    "--json",
    "--forceExit",
    "--no-coverage",
];
pub const JEST_SECURITY_ARGS: &[&str] = &[
    "jest",
    "tests/security",
    "--json",
    "--forceExit",
    "--no-coverage",
];
pub const JEST_COVERAGE_ARGS: &[&str] = &[
    "jest",
    "--coverage",
    "--coverageReporters=json-summary",
    "--forceExit",
];
pub const VITEST_ARGS: &[&str] = &["vitest", "run", "--reporter=json"];
pub const PLAYWRIGHT_ARGS: &[&str] = &["playwright", "test", "--reporter=json"];
pub const ESLINT_ARGS: &[&str] = &[
    "eslint",
    "packages/backend/src",
    "packages/frontend/src",
    "--ext",
    ".ts,.tsx",
    "-f",
    "json",
];
pub const TSC_BACKEND_ARGS: &[&str] = &[
    "tsc",
    "--noEmit",
    "--pretty",
    "false",
    "--diagnostics",
    "-p",
    "packages/backend/tsconfig.json",
];
pub const TSC_FRONTEND_ARGS: &[&str] = &[
    "tsc",
    "--noEmit",
    "--pretty",
    "false",
    "--diagnostics",
    "-p",
    "packages/frontend/tsconfig.json",
];

// Secrets scan constants
pub const SECRETS_TOTAL_ISSUES: u32 = 6;
pub const HARDCODED_SECRET_MARKERS: &[&str] = &["super-secret-key", "sk_live_", "sk_test_"];

// Scoring constants
pub const SECURITY_WEIGHT: f64 = 3.0;
pub const PERFORMANCE_WEIGHT: f64 = 2.0;
pub const QUALITY_WEIGHT: f64 = 1.5;
pub const LOGIC_WEIGHT: f64 = 2.5;
pub const REGRESSION_PENALTY: f64 = 5.0;
/// Categories scoring below this get recommendations in the report.
pub const RECOMMENDATION_THRESHOLD: f64 = 50.0;

impl ScorerConfig {
    pub fn from_args(args: CliArgs) -> Self {
        let output_path = args
            .output
            .unwrap_or_else(|| args.root.join(SCORE_RESULTS_FILE));
        let report_path = args
            .report_file
            .unwrap_or_else(|| args.root.join(REPORT_FILE));

        ScorerConfig {
            mode: args.mode,
            layout: ProjectLayout::new(args.root),
            baseline_path: args.baseline,
            command_timeout: Duration::from_secs(args.timeout_secs),
            output_path,
            report_path,
            log_file: args.log_file,
        }
    }
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backend_dir(&self) -> PathBuf {
        self.root.join("packages").join("backend")
    }

    pub fn frontend_dir(&self) -> PathBuf {
        self.root.join("packages").join("frontend")
    }

    /// Config file scanned for hardcoded secrets
    pub fn secrets_file(&self) -> PathBuf {
        self.backend_dir().join("src").join("config").join("secrets.ts")
    }

    /// json-summary written by the backend coverage run
    pub fn coverage_summary(&self) -> PathBuf {
        self.backend_dir()
            .join("coverage")
            .join("coverage-summary.json")
    }

    /// Pre-built frontend assets; the collector never triggers the build itself
    pub fn assets_dir(&self) -> PathBuf {
        self.frontend_dir().join("dist").join("assets")
    }
}
