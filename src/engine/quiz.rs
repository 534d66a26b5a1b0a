// src/engine/quiz.rs

//! Quiz grading and leaderboard ranking.
//!
//! Everything here is pure: handlers load the quiz, submissions and students
//! from the store and hand them over.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::models::{
    quiz::Question,
    submission::{AnswerResult, LeaderboardEntry, QuizSubmission, SubmittedAnswer},
    user::User,
};

/// Result of grading one answer sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    /// One entry per question, in question order.
    pub results: Vec<AnswerResult>,
    pub correct_count: usize,
    /// Integer percentage in [0, 100].
    pub score: i32,
}

/// Grades `answers` against `questions` index by index.
///
/// A missing entry (sheet shorter than the quiz) or an entry without a
/// selection counts as incorrect; entries beyond the last question are
/// ignored. There is no partial credit and no negative marking.
pub fn grade_answers(questions: &[Question], answers: &[SubmittedAnswer]) -> Grade {
    let results: Vec<AnswerResult> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = answers.get(index).and_then(|a| a.selected_answer);
            AnswerResult {
                question_index: index as i32,
                selected_answer: selected,
                is_correct: selected == Some(question.correct_answer),
            }
        })
        .collect();

    let correct_count = results.iter().filter(|r| r.is_correct).count();
    let score = percentage_half_up(correct_count, questions.len());

    Grade {
        results,
        correct_count,
        score,
    }
}

/// `round(100 * part / whole)` with halves rounded up, in integer arithmetic.
/// Returns 0 when `whole` is 0.
pub fn percentage_half_up(part: usize, whole: usize) -> i32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u64;
    let whole = whole as u64;
    ((200 * part + whole) / (2 * whole)) as i32
}

/// Builds the leaderboard of one quiz.
///
/// Submissions are grouped by student (best score, attempt count, latest
/// attempt). Students without a user record are skipped. Ordering is best
/// score descending, then the earlier `last_attempt` first; student id is the
/// final key so the output is fully deterministic.
pub fn rank_leaderboard(
    submissions: &[QuizSubmission],
    students: &HashMap<i64, User>,
) -> Vec<LeaderboardEntry> {
    let mut grouped: BTreeMap<i64, LeaderboardEntry> = BTreeMap::new();

    for submission in submissions {
        let Some(student) = students.get(&submission.student_id) else {
            continue;
        };
        grouped
            .entry(submission.student_id)
            .and_modify(|entry| {
                entry.best_score = entry.best_score.max(submission.score);
                entry.attempts += 1;
                entry.last_attempt = entry.last_attempt.max(submission.completed_at);
            })
            .or_insert_with(|| LeaderboardEntry {
                student_id: submission.student_id,
                first_name: student.first_name.clone(),
                last_name: student.last_name.clone(),
                best_score: submission.score,
                attempts: 1,
                last_attempt: submission.completed_at,
            });
    }

    let mut board: Vec<LeaderboardEntry> = grouped.into_values().collect();
    board.sort_by(compare_entries);
    board
}

fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.best_score
        .cmp(&a.best_score)
        .then_with(|| a.last_attempt.cmp(&b.last_attempt))
        .then_with(|| a.student_id.cmp(&b.student_id))
}
