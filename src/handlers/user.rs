// src/handlers/user.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::user::{Role, UserFilter, UserListParams},
    store::DynStore,
    utils::extract::RequestContext,
};

/// Active users of the caller's school with the requested role.
pub async fn list_users(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, AppError> {
    let role = params
        .role
        .ok_or_else(|| AppError::BadRequest("Role parameter is required".to_string()))?
        .parse::<Role>()
        .map_err(AppError::BadRequest)?;

    let users = store.list_users(&UserFilter::active(ctx.tenant_id, role)).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = store
        .find_user(id)
        .await?
        .filter(|u| u.tenant_id == ctx.tenant_id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}
