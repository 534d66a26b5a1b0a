// src/handlers/teacher.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        progress::TeacherDashboard,
        user::{Role, UserFilter},
    },
    store::DynStore,
    utils::extract::RequestContext,
};

/// Teacher routes are scoped to the caller: `{id}` must be their own id.
fn own_teacher_id(ctx: &RequestContext, id: i64) -> Result<i64, AppError> {
    ctx.require_role(&[Role::Teacher])?;
    if id != ctx.user_id {
        return Err(AppError::Forbidden("Not authorized to view this teacher".to_string()));
    }
    Ok(id)
}

pub async fn get_quizzes(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let teacher_id = own_teacher_id(&ctx, id)?;
    let quizzes = store.list_quizzes(ctx.tenant_id, Some(teacher_id)).await?;
    Ok(Json(quizzes))
}

pub async fn get_drills(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let teacher_id = own_teacher_id(&ctx, id)?;
    let drills = store.list_drills(ctx.tenant_id, Some(teacher_id)).await?;
    Ok(Json(drills))
}

/// Active students of the teacher's school.
pub async fn get_students(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    own_teacher_id(&ctx, id)?;
    let students = store
        .list_users(&UserFilter::active(ctx.tenant_id, Role::Student))
        .await?;
    Ok(Json(students))
}

pub async fn get_dashboard(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let teacher_id = own_teacher_id(&ctx, id)?;

    let dashboard = TeacherDashboard {
        total_quizzes: store.list_quizzes(ctx.tenant_id, Some(teacher_id)).await?.len(),
        total_drills: store.list_drills(ctx.tenant_id, Some(teacher_id)).await?.len(),
        total_students: store
            .list_users(&UserFilter::active(ctx.tenant_id, Role::Student))
            .await?
            .len(),
    };
    Ok(Json(dashboard))
}
