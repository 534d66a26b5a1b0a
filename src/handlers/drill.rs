// src/handlers/drill.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        drill::{CreateDrillRequest, NewDrill, UpdateDrillStatusRequest},
        user::Role,
    },
    store::DynStore,
    utils::{
        extract::{RequestContext, ValidatedJson},
        html::clean_optional,
    },
};

/// Drills of the caller's school, by scheduled date.
pub async fn list_drills(
    State(store): State<DynStore>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let drills = store.list_drills(ctx.tenant_id, None).await?;
    Ok(Json(drills))
}

/// Schedules a drill. Teacher only; participants must belong to the school.
pub async fn create_drill(
    State(store): State<DynStore>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateDrillRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Teacher])?;

    let mut participants = payload.participants;
    participants.sort_unstable();
    participants.dedup();
    for id in &participants {
        let member = store
            .find_user(*id)
            .await?
            .is_some_and(|u| u.tenant_id == ctx.tenant_id);
        if !member {
            return Err(AppError::BadRequest(format!("Unknown participant {}", id)));
        }
    }

    let drill = store
        .create_drill(NewDrill {
            tenant_id: ctx.tenant_id,
            created_by: ctx.user_id,
            title: payload.title.trim().to_string(),
            description: clean_optional(payload.description.as_deref()),
            scheduled_date: payload.scheduled_date,
            participants,
        })
        .await?;

    tracing::info!(drill_id = drill.id, tenant_id = ctx.tenant_id, "Drill scheduled");
    Ok((StatusCode::CREATED, Json(drill)))
}

/// Teacher only.
pub async fn update_drill_status(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateDrillStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Teacher])?;

    let drill = store
        .update_drill_status(
            ctx.tenant_id,
            id,
            payload.status,
            clean_optional(payload.feedback.as_deref()),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Drill not found".to_string()))?;

    Ok(Json(drill))
}

/// Teacher only.
pub async fn delete_drill(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Teacher])?;

    if !store.delete_drill(ctx.tenant_id, id).await? {
        return Err(AppError::NotFound("Drill not found".to_string()));
    }
    Ok(Json(json!({ "success": true, "message": "Drill deleted successfully" })))
}
