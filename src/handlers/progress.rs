// src/handlers/progress.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    config::DEFAULT_PASSING_SCORE,
    engine::progress::{StudentProgress, TenantTotals, compute_student_progress},
    error::AppError,
    handlers::{resource::completion_views, student::load_viewable_student},
    models::{
        progress::{ClassProgressEntry, StudentProgressResponse},
        submission::{QuizSubmission, StudentSubmission},
        user::{Role, User, UserFilter},
    },
    store::DynStore,
    utils::extract::RequestContext,
};

pub(crate) async fn tenant_totals(store: &DynStore, tenant_id: i64) -> Result<TenantTotals, AppError> {
    Ok(TenantTotals {
        total_quizzes: store.count_quizzes(tenant_id).await?,
        total_public_resources: store.count_public_resources(tenant_id).await?,
    })
}

/// Attaches the pass/fail verdict of each submission's quiz.
pub(crate) async fn student_submissions(
    store: &DynStore,
    tenant_id: i64,
    student: &User,
    submissions: Vec<QuizSubmission>,
) -> Result<Vec<StudentSubmission>, AppError> {
    let passing: HashMap<i64, i32> = store
        .list_quizzes(tenant_id, None)
        .await?
        .into_iter()
        .map(|q| (q.id, q.passing_score))
        .collect();

    Ok(submissions
        .into_iter()
        .map(|s| StudentSubmission {
            student: Some(student.summary()),
            passed: s.score >= passing.get(&s.quiz_id).copied().unwrap_or(DEFAULT_PASSING_SCORE),
            submission: s,
        })
        .collect())
}

/// Full progress report of one student: percentages plus the underlying records.
pub(crate) async fn student_report(
    store: &DynStore,
    tenant_id: i64,
    student: &User,
) -> Result<StudentProgressResponse, AppError> {
    let totals = tenant_totals(store, tenant_id).await?;
    let submissions = store.list_student_submissions(student.id).await?;
    let completions = store.list_student_completions(student.id).await?;

    let scores: Vec<i32> = submissions.iter().map(|s| s.score).collect();
    let progress = compute_student_progress(totals, &scores, completions.len() as u64);

    Ok(StudentProgressResponse {
        student: student.summary(),
        progress: progress.snapshot(),
        quiz_submissions: student_submissions(store, tenant_id, student, submissions).await?,
        resource_completions: completion_views(store, tenant_id, completions).await?,
    })
}

async fn progress_of(
    store: &DynStore,
    totals: TenantTotals,
    student_id: i64,
) -> Result<StudentProgress, AppError> {
    let scores: Vec<i32> = store
        .list_student_submissions(student_id)
        .await?
        .iter()
        .map(|s| s.score)
        .collect();
    let completed_resources = store.list_student_completions(student_id).await?.len() as u64;
    Ok(compute_student_progress(totals, &scores, completed_resources))
}

/// `GET /api/progress/student/{id}`.
///
/// Students may only read themselves, parents only their linked student.
pub async fn get_student_progress(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(student_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = load_viewable_student(&store, &ctx, student_id).await?;
    let report = student_report(&store, ctx.tenant_id, &student).await?;
    Ok(Json(report))
}

/// `GET /api/progress/class`: every active student of the school. Teacher only.
pub async fn get_class_progress(
    State(store): State<DynStore>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Teacher])?;

    let totals = tenant_totals(&store, ctx.tenant_id).await?;
    let students = store
        .list_users(&UserFilter::active(ctx.tenant_id, Role::Student))
        .await?;

    let mut rows = Vec::with_capacity(students.len());
    for student in &students {
        let progress = progress_of(&store, totals, student.id).await?;
        rows.push(ClassProgressEntry {
            student: student.summary(),
            progress: progress.snapshot(),
            completed_quizzes: progress.completed_quizzes,
            completed_resources: progress.completed_resources,
        });
    }

    tracing::debug!(tenant_id = ctx.tenant_id, students = rows.len(), "Class progress computed");
    Ok(Json(rows))
}
