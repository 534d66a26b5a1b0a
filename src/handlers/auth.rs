// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, NewUser, RegisterUserRequest, Role, normalize_email},
    store::DynStore,
    utils::{
        extract::{RequestContext, ValidatedJson},
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a teacher, student or parent into an existing school.
///
/// Students must carry a grade; parents must be linked to an active student
/// of the same school. Directors are only created with their school.
pub async fn register(
    State(store): State<DynStore>,
    State(config): State<Config>,
    ValidatedJson(payload): ValidatedJson<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.role == Role::Director {
        return Err(AppError::BadRequest(
            "Directors are registered together with their school".to_string(),
        ));
    }

    let tenant = store
        .find_tenant(payload.tenant_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::BadRequest("Invalid school selected".to_string()))?;

    let grade = payload.grade.map(|g| g.trim().to_string()).filter(|g| !g.is_empty());
    if payload.role == Role::Student && grade.is_none() {
        return Err(AppError::BadRequest("Grade is required for students".to_string()));
    }

    let student_id = match payload.role {
        Role::Parent => {
            let student_id = payload.student_id.ok_or_else(|| {
                AppError::BadRequest("Parents must be linked to a student".to_string())
            })?;
            let linked = store.find_user(student_id).await?.filter(|s| {
                s.role == Role::Student && s.tenant_id == tenant.id && s.is_active
            });
            if linked.is_none() {
                return Err(AppError::BadRequest(
                    "Linked student not found in this school".to_string(),
                ));
            }
            Some(student_id)
        }
        _ => None,
    };

    let user = store
        .create_user(NewUser {
            tenant_id: tenant.id,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            email: normalize_email(&payload.email),
            password_hash: hash_password(&payload.password)?,
            role: payload.role,
            grade,
            phone: payload.phone,
            student_id,
        })
        .await?;

    tracing::info!(user_id = user.id, tenant_id = tenant.id, role = user.role.as_str(), "User registered");

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "token": token,
            "user": user,
        })),
    ))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::AuthError("Invalid email or password".to_string());

    let user = store
        .find_user_by_email(&normalize_email(&payload.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(AppError::AuthError("Account is deactivated".to_string()));
    }

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": user,
    })))
}

/// Returns the profile of the authenticated user.
pub async fn me(
    State(store): State<DynStore>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let user = store
        .find_user(ctx.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "success": true, "user": user })))
}
