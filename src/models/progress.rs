// src/models/progress.rs

use serde::{Deserialize, Serialize};

use crate::models::{
    resource::CompletionView, submission::StudentSubmission, user::UserSummary,
};

/// Rounded, presentation-ready progress percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub overall: i64,
    pub quizzes: i64,
    pub resources: i64,
    pub average_score: i64,
}

/// `GET /api/progress/student/{id}` payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgressResponse {
    pub student: UserSummary,
    pub progress: ProgressSnapshot,
    pub quiz_submissions: Vec<StudentSubmission>,
    pub resource_completions: Vec<CompletionView>,
}

/// One row of `GET /api/progress/class`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassProgressEntry {
    pub student: UserSummary,
    pub progress: ProgressSnapshot,
    pub completed_quizzes: u64,
    pub completed_resources: u64,
}

/// Trailing window for director analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    SevenDays,
    ThirtyDays,
}

impl TimeRange {
    /// Anything other than `30days` falls back to the seven-day window.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("30days") => TimeRange::ThirtyDays,
            _ => TimeRange::SevenDays,
        }
    }

    pub fn days(self) -> u32 {
        match self {
            TimeRange::SevenDays => 7,
            TimeRange::ThirtyDays => 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    pub time_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    /// ISO date (YYYY-MM-DD, UTC).
    pub date: chrono::NaiveDate,
    pub active_users: usize,
    pub new_registrations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub resource_id: i64,
    pub name: String,
    pub completions: usize,
    pub completion_rate: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPerformance {
    pub quiz_id: i64,
    pub category: String,
    pub average_score: i64,
    pub participants: usize,
    pub total_questions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    /// Active students of the tenant.
    pub total_users: usize,
    pub total_resources: usize,
    pub active_alerts: usize,
    pub avg_quiz_score: i64,
    pub total_completions: usize,
    /// Percentage of students with at least one submission or completion.
    pub engagement_rate: i64,
}

/// `GET /api/director/analytics` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantAnalytics {
    pub user_activity: Vec<DailyActivity>,
    pub resource_usage: Vec<ResourceUsage>,
    pub quiz_performance: Vec<QuizPerformance>,
    pub system_metrics: SystemMetrics,
}

/// `GET /api/director/stats` payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorStats {
    pub total_students: usize,
    pub total_teachers: usize,
    pub total_resources: usize,
    pub total_quizzes: u64,
    pub total_drills: usize,
    pub active_alerts: usize,
}

/// `GET /api/teachers/{id}/dashboard` payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboard {
    pub total_quizzes: usize,
    pub total_drills: usize,
    pub total_students: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_range_defaults_to_seven_days() {
        assert_eq!(TimeRange::parse(None).days(), 7);
        assert_eq!(TimeRange::parse(Some("7days")).days(), 7);
        assert_eq!(TimeRange::parse(Some("90days")).days(), 7);
        assert_eq!(TimeRange::parse(Some("30days")).days(), 30);
    }
}
