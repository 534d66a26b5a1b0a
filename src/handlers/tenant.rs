// src/handlers/tenant.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    config::Config,
    error::AppError,
    models::{
        tenant::{NewTenant, RegisterSchoolRequest, SchoolListItem, Tenant, UpdateTenantRequest},
        user::{NewUser, Role, normalize_email},
    },
    store::DynStore,
    utils::{
        extract::{RequestContext, ValidatedJson},
        hash::hash_password,
        jwt::sign_jwt,
    },
};

/// Registers a new school together with its first director.
pub async fn register_school(
    State(store): State<DynStore>,
    State(config): State<Config>,
    ValidatedJson(payload): ValidatedJson<RegisterSchoolRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&payload.email);

    let tenant = NewTenant {
        name: payload.school_name.trim().to_string(),
        address: payload.address.map(|a| a.trim().to_string()).unwrap_or_default(),
        contact_email: email.clone(),
        contact_phone: payload.contact_phone.unwrap_or_default(),
    };
    let director = NewUser {
        tenant_id: 0,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        email,
        password_hash: hash_password(&payload.password)?,
        role: Role::Director,
        grade: None,
        phone: None,
        student_id: None,
    };

    let (tenant, user) = store.create_school(tenant, director).await?;
    tracing::info!(tenant_id = tenant.id, director_id = user.id, "School registered");

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "School registered successfully",
            "token": token,
            "user": user,
            "tenant": tenant,
        })),
    ))
}

/// Public list of active schools, used by the registration form.
pub async fn list_schools(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let schools: Vec<SchoolListItem> = store
        .list_active_tenants()
        .await?
        .iter()
        .map(SchoolListItem::from)
        .collect();
    Ok(Json(schools))
}

async fn own_tenant(store: &DynStore, ctx: &RequestContext, id: i64) -> Result<Tenant, AppError> {
    if id != ctx.tenant_id {
        return Err(AppError::NotFound("Tenant not found".to_string()));
    }
    store
        .find_tenant(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))
}

pub async fn get_tenant(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = own_tenant(&store, &ctx, id).await?;
    Ok(Json(tenant))
}

/// Updates the caller's own school. Director only.
pub async fn update_tenant(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Director])?;

    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let mut tenant = own_tenant(&store, &ctx, id).await?;
    payload.apply_to(&mut tenant);
    let tenant = store.update_tenant(&tenant).await?;

    tracing::info!(tenant_id = tenant.id, "Tenant updated");
    Ok(Json(json!({
        "success": true,
        "message": "Tenant updated successfully",
        "tenant": tenant,
    })))
}
