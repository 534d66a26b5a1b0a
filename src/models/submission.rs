// src/models/submission.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::models::user::UserSummary;

/// Outcome of one question within a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub question_index: i32,
    /// `None` when the student left the question unanswered.
    pub selected_answer: Option<i32>,
    pub is_correct: bool,
}

/// Represents the 'quiz_submissions' table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub answers: Json<Vec<AnswerResult>>,
    /// Integer percentage in [0, 100].
    pub score: i32,
    /// Seconds.
    pub time_taken: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for the store.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub quiz_id: i64,
    pub student_id: i64,
    pub answers: Vec<AnswerResult>,
    pub score: i32,
    pub time_taken: i32,
}

/// One entry of a submitted answer sheet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    #[serde(default)]
    pub selected_answer: Option<i32>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    /// One entry per question, in question order.
    pub answers: Vec<SubmittedAnswer>,

    #[validate(range(min = 0, message = "timeTaken cannot be negative"))]
    #[serde(default)]
    pub time_taken: i32,
}

/// Submission enriched with the read-time pass/fail verdict.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    #[serde(flatten)]
    pub submission: QuizSubmission,
    pub passed: bool,
    pub correct_count: usize,
    pub total_questions: usize,
}

/// Aggregated row for the per-quiz leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub best_score: i32,
    pub attempts: u32,
    pub last_attempt: chrono::DateTime<chrono::Utc>,
}

/// A submission shown alongside the student that made it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSubmission {
    #[serde(flatten)]
    pub submission: QuizSubmission,
    pub student: Option<UserSummary>,
    pub passed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answer_entries_are_unanswered() {
        let req: SubmitQuizRequest = serde_json::from_value(serde_json::json!({
            "answers": [{"selectedAnswer": 2}, {}],
            "timeTaken": 42
        }))
        .unwrap();
        assert_eq!(req.answers[0].selected_answer, Some(2));
        assert_eq!(req.answers[1].selected_answer, None);
        assert_eq!(req.time_taken, 42);
    }

    #[test]
    fn non_array_answers_fail_to_parse() {
        let parsed: Result<SubmitQuizRequest, _> = serde_json::from_value(serde_json::json!({
            "answers": "0,1,2",
            "timeTaken": 10
        }));
        assert!(parsed.is_err());
    }
}
