// src/handlers/parent.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    handlers::progress::student_report,
    models::{
        tenant::{EmergencyInfo, SchoolInfo},
        user::{Role, User, UserFilter},
    },
    store::DynStore,
    utils::extract::RequestContext,
};

/// School contacts plus the first active director and teacher.
pub(crate) async fn emergency_info(
    store: &DynStore,
    tenant_id: i64,
) -> Result<EmergencyInfo, AppError> {
    let tenant = store
        .find_tenant(tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("School not found".to_string()))?;

    let director = store
        .list_users(&UserFilter::active(tenant_id, Role::Director))
        .await?
        .first()
        .map(User::contact);
    let teacher = store
        .list_users(&UserFilter::active(tenant_id, Role::Teacher))
        .await?
        .first()
        .map(User::contact);

    Ok(EmergencyInfo {
        emergency_contacts: tenant.emergency_contacts.0.clone(),
        school_info: SchoolInfo::from(&tenant),
        director,
        teacher,
    })
}

/// The calling parent, who must be the `{id}` in the path.
async fn load_parent(store: &DynStore, ctx: &RequestContext, id: i64) -> Result<User, AppError> {
    ctx.require_role(&[Role::Parent])?;
    if id != ctx.user_id {
        return Err(AppError::Forbidden("Not authorized to view this parent".to_string()));
    }
    store
        .find_user(id)
        .await?
        .filter(|u| u.tenant_id == ctx.tenant_id)
        .ok_or_else(|| AppError::NotFound("Parent not found".to_string()))
}

/// Progress report of the parent's linked student.
pub async fn get_student_progress(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let parent = load_parent(&store, &ctx, id).await?;

    let student_id = parent
        .student_id
        .ok_or_else(|| AppError::NotFound("No student linked to this parent".to_string()))?;
    let student = store
        .find_user(student_id)
        .await?
        .filter(|s| s.role == Role::Student && s.tenant_id == ctx.tenant_id)
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    let report = student_report(&store, ctx.tenant_id, &student).await?;
    Ok(Json(report))
}

pub async fn get_emergency_contacts(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    load_parent(&store, &ctx, id).await?;
    let info = emergency_info(&store, ctx.tenant_id).await?;
    Ok(Json(info))
}
