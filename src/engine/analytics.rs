// src/engine/analytics.rs

//! Read-side reporting for directors. No state is persisted.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::ANALYTICS_TOP_N;
use crate::engine::progress::round_half_up;
use crate::models::{
    progress::{DailyActivity, QuizPerformance, ResourceUsage, SystemMetrics, TenantAnalytics},
    quiz::Quiz,
    resource::{Resource, ResourceCompletion},
    submission::QuizSubmission,
    user::User,
};

/// Everything the report is computed from, already scoped to one tenant.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsInput<'a> {
    /// Active students of the tenant.
    pub students: &'a [User],
    pub resources: &'a [Resource],
    pub quizzes: &'a [Quiz],
    pub submissions: &'a [QuizSubmission],
    pub completions: &'a [ResourceCompletion],
    pub active_alerts: usize,
}

/// Builds the analytics report for the trailing `days` ending at `now`.
///
/// Activity is bucketed per UTC calendar day, oldest first, today included.
/// Submissions and completions older than `now - days` are ignored.
pub fn compute_tenant_analytics(
    input: AnalyticsInput<'_>,
    days: u32,
    now: DateTime<Utc>,
) -> TenantAnalytics {
    let since = now - Duration::days(i64::from(days));
    let submissions: Vec<&QuizSubmission> = input
        .submissions
        .iter()
        .filter(|s| s.completed_at >= since)
        .collect();
    let completions: Vec<&ResourceCompletion> = input
        .completions
        .iter()
        .filter(|c| c.completed_at >= since)
        .collect();

    let student_ids: HashSet<i64> = input.students.iter().map(|s| s.id).collect();
    let total_students = input.students.len();

    TenantAnalytics {
        user_activity: daily_activity(input.students, &submissions, &completions, days, now),
        resource_usage: resource_usage(input.resources, &completions, total_students),
        quiz_performance: quiz_performance(input.quizzes, &submissions),
        system_metrics: SystemMetrics {
            total_users: total_students,
            total_resources: input.resources.len(),
            active_alerts: input.active_alerts,
            avg_quiz_score: mean_score(submissions.iter().map(|s| s.score)),
            total_completions: completions.len(),
            engagement_rate: engagement_rate(&student_ids, &submissions, &completions),
        },
    }
}

fn daily_activity(
    students: &[User],
    submissions: &[&QuizSubmission],
    completions: &[&ResourceCompletion],
    days: u32,
    now: DateTime<Utc>,
) -> Vec<DailyActivity> {
    let mut active_by_day: HashMap<NaiveDate, HashSet<i64>> = HashMap::new();
    for s in submissions {
        active_by_day
            .entry(s.completed_at.date_naive())
            .or_default()
            .insert(s.student_id);
    }
    for c in completions {
        active_by_day
            .entry(c.completed_at.date_naive())
            .or_default()
            .insert(c.student_id);
    }

    let mut registrations_by_day: HashMap<NaiveDate, usize> = HashMap::new();
    for student in students {
        *registrations_by_day
            .entry(student.created_at.date_naive())
            .or_default() += 1;
    }

    let today = now.date_naive();
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(i64::from(offset));
            DailyActivity {
                date,
                active_users: active_by_day.get(&date).map_or(0, HashSet::len),
                new_registrations: registrations_by_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

fn resource_usage(
    resources: &[Resource],
    completions: &[&ResourceCompletion],
    total_students: usize,
) -> Vec<ResourceUsage> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for c in completions {
        *counts.entry(c.resource_id).or_default() += 1;
    }

    let mut usage: Vec<ResourceUsage> = resources
        .iter()
        .map(|r| {
            let completions = counts.get(&r.id).copied().unwrap_or(0);
            let completion_rate = if completions > 0 && total_students > 0 {
                round_half_up(completions as f64 / total_students as f64 * 100.0)
            } else {
                0
            };
            ResourceUsage {
                resource_id: r.id,
                name: r.title.clone(),
                completions,
                completion_rate,
            }
        })
        .collect();

    // Stable: ties keep the store order.
    usage.sort_by(|a, b| b.completions.cmp(&a.completions));
    usage.truncate(ANALYTICS_TOP_N);
    usage
}

fn quiz_performance(quizzes: &[Quiz], submissions: &[&QuizSubmission]) -> Vec<QuizPerformance> {
    let mut scores: HashMap<i64, Vec<i32>> = HashMap::new();
    for s in submissions {
        scores.entry(s.quiz_id).or_default().push(s.score);
    }

    let mut performance: Vec<QuizPerformance> = quizzes
        .iter()
        .map(|q| {
            let quiz_scores = scores.get(&q.id).map(Vec::as_slice).unwrap_or(&[]);
            QuizPerformance {
                quiz_id: q.id,
                category: q.title.clone(),
                average_score: mean_score(quiz_scores.iter().copied()),
                participants: quiz_scores.len(),
                total_questions: q.questions.len(),
            }
        })
        .collect();

    performance.sort_by(|a, b| b.average_score.cmp(&a.average_score));
    performance.truncate(ANALYTICS_TOP_N);
    performance
}

fn mean_score(scores: impl Iterator<Item = i32>) -> i64 {
    let (sum, count) = scores.fold((0i64, 0usize), |(sum, n), s| (sum + i64::from(s), n + 1));
    if count == 0 {
        return 0;
    }
    round_half_up(sum as f64 / count as f64)
}

fn engagement_rate(
    student_ids: &HashSet<i64>,
    submissions: &[&QuizSubmission],
    completions: &[&ResourceCompletion],
) -> i64 {
    if student_ids.is_empty() {
        return 0;
    }
    let engaged: HashSet<i64> = submissions
        .iter()
        .map(|s| s.student_id)
        .chain(completions.iter().map(|c| c.student_id))
        .filter(|id| student_ids.contains(id))
        .collect();
    round_half_up(engaged.len() as f64 / student_ids.len() as f64 * 100.0)
}
