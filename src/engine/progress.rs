// src/engine/progress.rs

//! Per-student progress roll-up.

use crate::models::progress::ProgressSnapshot;

/// Tenant-wide denominators shared by every student of a class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TenantTotals {
    pub total_quizzes: u64,
    /// Only resources flagged public are counted.
    pub total_public_resources: u64,
}

/// Unrounded progress of one student.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentProgress {
    /// Number of submission records, repeats included.
    pub completed_quizzes: u64,
    pub completed_resources: u64,
    pub quiz_progress: f64,
    pub resource_progress: f64,
    pub overall: f64,
    pub average_score: f64,
}

/// Computes a student's progress from the tenant totals, the student's
/// submission scores and their number of resource completions.
///
/// Every submission counts as a completed quiz, so retakes can push
/// `quiz_progress` above 100.
pub fn compute_student_progress(
    totals: TenantTotals,
    submission_scores: &[i32],
    completed_resources: u64,
) -> StudentProgress {
    let completed_quizzes = submission_scores.len() as u64;

    let quiz_progress = ratio_percent(completed_quizzes, totals.total_quizzes);
    let resource_progress = ratio_percent(completed_resources, totals.total_public_resources);
    let overall = (quiz_progress + resource_progress) / 2.0;

    let average_score = if submission_scores.is_empty() {
        0.0
    } else {
        let sum: i64 = submission_scores.iter().map(|&s| s as i64).sum();
        sum as f64 / submission_scores.len() as f64
    };

    StudentProgress {
        completed_quizzes,
        completed_resources,
        quiz_progress,
        resource_progress,
        overall,
        average_score,
    }
}

fn ratio_percent(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    done as f64 / total as f64 * 100.0
}

/// Nearest-integer rounding with halves going up.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

impl StudentProgress {
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            overall: round_half_up(self.overall),
            quizzes: round_half_up(self.quiz_progress),
            resources: round_half_up(self.resource_progress),
            average_score: round_half_up(self.average_score),
        }
    }
}
