// src/handlers/student.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    handlers::{
        parent::emergency_info,
        progress::student_submissions,
        resource::completion_views,
    },
    models::user::{Role, User, UserFilter, UserSummary},
    store::DynStore,
    utils::extract::RequestContext,
};

/// Loads a student the caller is allowed to look at.
///
/// Students outside the caller's school are `NotFound`. Inside the school,
/// students may only see themselves and parents only their linked student;
/// teachers and directors see everyone.
pub(crate) async fn load_viewable_student(
    store: &DynStore,
    ctx: &RequestContext,
    student_id: i64,
) -> Result<User, AppError> {
    let student = store
        .find_user(student_id)
        .await?
        .filter(|u| u.role == Role::Student && u.tenant_id == ctx.tenant_id)
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    let allowed = match ctx.role {
        Role::Teacher | Role::Director => true,
        Role::Student => ctx.user_id == student.id,
        Role::Parent => store
            .find_user(ctx.user_id)
            .await?
            .is_some_and(|p| p.student_id == Some(student.id)),
    };

    if !allowed {
        return Err(AppError::Forbidden("Not authorized to view this student".to_string()));
    }
    Ok(student)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDirectoryParams {
    pub tenant_id: Option<i64>,
}

/// Public: active students of a school, for linking a parent at registration.
pub async fn list_for_registration(
    State(store): State<DynStore>,
    Query(params): Query<StudentDirectoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = params
        .tenant_id
        .ok_or_else(|| AppError::BadRequest("tenantId is required".to_string()))?;

    store
        .find_tenant(tenant_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::NotFound("School not found".to_string()))?;

    let students: Vec<UserSummary> = store
        .list_users(&UserFilter::active(tenant_id, Role::Student))
        .await?
        .iter()
        .map(User::summary)
        .collect();
    Ok(Json(students))
}

pub async fn get_student(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = load_viewable_student(&store, &ctx, id).await?;
    Ok(Json(student))
}

pub async fn get_student_parents(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = load_viewable_student(&store, &ctx, id).await?;

    let parents = store
        .list_users(&UserFilter {
            tenant_id: ctx.tenant_id,
            role: Some(Role::Parent),
            linked_student: Some(student.id),
            active_only: true,
        })
        .await?;
    let contacts: Vec<_> = parents.iter().map(User::contact).collect();
    Ok(Json(contacts))
}

pub async fn get_student_submissions(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = load_viewable_student(&store, &ctx, id).await?;
    let submissions = store.list_student_submissions(student.id).await?;
    let rows = student_submissions(&store, ctx.tenant_id, &student, submissions).await?;
    Ok(Json(rows))
}

pub async fn get_completed_resources(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = load_viewable_student(&store, &ctx, id).await?;
    let completions = store.list_student_completions(student.id).await?;
    let views = completion_views(&store, ctx.tenant_id, completions).await?;
    Ok(Json(views))
}

pub async fn get_emergency_contacts(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    load_viewable_student(&store, &ctx, id).await?;
    let info = emergency_info(&store, ctx.tenant_id).await?;
    Ok(Json(info))
}
