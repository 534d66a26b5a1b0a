// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    engine::quiz::{grade_answers, rank_leaderboard},
    error::AppError,
    models::{
        quiz::{CreateQuizRequest, Quiz},
        submission::{NewSubmission, StudentSubmission, SubmissionView, SubmitQuizRequest},
        user::{Role, User, UserFilter},
    },
    store::DynStore,
    utils::{
        extract::{RequestContext, ValidatedJson},
        html::clean_optional,
    },
};

async fn load_quiz(store: &DynStore, ctx: &RequestContext, id: i64) -> Result<Quiz, AppError> {
    store
        .find_quiz(ctx.tenant_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
}

/// Every student of the tenant, active or not, keyed by id.
pub(crate) async fn tenant_students(
    store: &DynStore,
    tenant_id: i64,
) -> Result<HashMap<i64, User>, AppError> {
    let filter = UserFilter {
        tenant_id,
        role: Some(Role::Student),
        ..Default::default()
    };
    Ok(store
        .list_users(&filter)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

/// Lists the quizzes of the caller's school.
/// Students receive the questions without their answer keys.
pub async fn list_quizzes(
    State(store): State<DynStore>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let quizzes = store.list_quizzes(ctx.tenant_id, None).await?;

    if ctx.is(Role::Student) {
        let public: Vec<_> = quizzes.iter().map(Quiz::public_view).collect();
        return Ok(Json(public).into_response());
    }
    Ok(Json(quizzes).into_response())
}

pub async fn get_quiz(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let quiz = load_quiz(&store, &ctx, id).await?;

    if ctx.is(Role::Student) {
        return Ok(Json(quiz.public_view()).into_response());
    }
    Ok(Json(quiz).into_response())
}

/// Creates a quiz. Teacher only.
pub async fn create_quiz(
    State(store): State<DynStore>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Teacher])?;

    if let Some(resource_id) = payload.resource_id {
        if store.find_resource(ctx.tenant_id, resource_id).await?.is_none() {
            return Err(AppError::BadRequest("Linked resource not found".to_string()));
        }
    }

    let mut new_quiz = payload.into_new_quiz(ctx.tenant_id, ctx.user_id);
    new_quiz.description = clean_optional(new_quiz.description.as_deref());

    let quiz = store.create_quiz(new_quiz).await?;
    tracing::info!(quiz_id = quiz.id, teacher_id = ctx.user_id, "Quiz created");

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Deletes a quiz and all of its submissions. Only its creator may do so.
pub async fn delete_quiz(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Teacher])?;

    let quiz = load_quiz(&store, &ctx, id).await?;
    if quiz.created_by != ctx.user_id {
        return Err(AppError::Forbidden("Not authorized to delete this quiz".to_string()));
    }

    if !store.delete_quiz(ctx.tenant_id, id).await? {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }
    tracing::info!(quiz_id = id, "Quiz deleted");

    Ok(Json(json!({ "success": true, "message": "Quiz removed" })))
}

/// Grades an answer sheet and records the attempt. Student only.
pub async fn submit_quiz(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Student])?;

    let quiz = load_quiz(&store, &ctx, id).await?;
    let grade = grade_answers(&quiz.questions, &payload.answers);

    let submission = store
        .insert_submission(NewSubmission {
            quiz_id: quiz.id,
            student_id: ctx.user_id,
            answers: grade.results,
            score: grade.score,
            time_taken: payload.time_taken,
        })
        .await?;

    tracing::info!(
        quiz_id = quiz.id,
        student_id = ctx.user_id,
        score = submission.score,
        "Quiz submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmissionView {
            passed: quiz.is_passing(submission.score),
            correct_count: grade.correct_count,
            total_questions: quiz.questions.len(),
            submission,
        }),
    ))
}

/// Submissions of one quiz. Students only see their own attempts.
pub async fn get_quiz_submissions(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = load_quiz(&store, &ctx, quiz_id).await?;

    let only_student = match ctx.role {
        Role::Student => Some(ctx.user_id),
        Role::Parent => match store.find_user(ctx.user_id).await?.and_then(|p| p.student_id) {
            Some(student_id) => Some(student_id),
            None => return Ok(Json(Vec::<StudentSubmission>::new())),
        },
        Role::Teacher | Role::Director => None,
    };

    let submissions = store.list_quiz_submissions(quiz.id, only_student).await?;
    let students = tenant_students(&store, ctx.tenant_id).await?;

    let rows: Vec<StudentSubmission> = submissions
        .into_iter()
        .map(|s| StudentSubmission {
            student: students.get(&s.student_id).map(User::summary),
            passed: quiz.is_passing(s.score),
            submission: s,
        })
        .collect();

    Ok(Json(rows))
}

/// Per-student best scores for one quiz.
pub async fn get_leaderboard(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = load_quiz(&store, &ctx, quiz_id).await?;

    let submissions = store.list_quiz_submissions(quiz.id, None).await?;
    let students = tenant_students(&store, ctx.tenant_id).await?;

    Ok(Json(rank_leaderboard(&submissions, &students)))
}
