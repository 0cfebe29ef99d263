pub mod calculator;

pub use calculator::{calculate_score, count_regressions, ScoreBreakdown};
