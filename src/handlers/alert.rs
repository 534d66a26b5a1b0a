// src/handlers/alert.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        alert::{AlertListResponse, AlertResponse, NewAlert, SendAlertRequest, UpdateAlertStatusRequest},
        user::{Role, UserFilter},
    },
    notify::AlertNotifier,
    store::DynStore,
    utils::{
        extract::{RequestContext, ValidatedJson},
        html::clean_html,
    },
};

/// Broadcasts an alert to every active user holding one of the target roles.
pub async fn send_alert(
    State(store): State<DynStore>,
    State(notifier): State<Arc<dyn AlertNotifier>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<SendAlertRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Director, Role::Teacher, Role::Student])?;

    let message = clean_html(&payload.message);
    if message.is_empty() {
        return Err(AppError::BadRequest("Message and targetRoles are required".to_string()));
    }

    let mut target_roles = payload.target_roles;
    target_roles.sort_by_key(|r| r.as_str());
    target_roles.dedup();

    let mut recipients = Vec::new();
    for role in &target_roles {
        recipients.extend(
            store
                .list_users(&UserFilter::active(ctx.tenant_id, *role))
                .await?,
        );
    }
    if recipients.is_empty() {
        return Err(AppError::NotFound(
            "No active users found for selected roles".to_string(),
        ));
    }

    let alert = store
        .create_alert(NewAlert {
            tenant_id: ctx.tenant_id,
            sender_id: ctx.user_id,
            message,
            target_roles,
            emergency_level: payload.emergency_level,
        })
        .await?;

    notifier.dispatch(&alert, &recipients).await?;
    let alert = store.mark_alert_sent(alert.id).await?;

    tracing::info!(alert_id = alert.id, recipients = recipients.len(), "Alert sent");
    Ok((
        StatusCode::CREATED,
        Json(AlertResponse {
            success: true,
            alert,
            message: "Alert sent successfully".to_string(),
        }),
    ))
}

/// Non-dismissed alerts of the caller's school, newest first.
pub async fn list_alerts(
    State(store): State<DynStore>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let alerts = store.list_alerts(ctx.tenant_id).await?;
    Ok(Json(AlertListResponse {
        success: true,
        count: alerts.len(),
        alerts,
    }))
}

pub async fn dismiss_alert(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let alert = store
        .dismiss_alert(ctx.tenant_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert not found or access denied".to_string()))?;

    Ok(Json(AlertResponse {
        success: true,
        alert,
        message: "Alert dismissed successfully".to_string(),
    }))
}

/// Director or teacher.
pub async fn update_alert_status(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateAlertStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Director, Role::Teacher])?;

    let alert = store
        .update_alert_status(ctx.tenant_id, id, payload.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert not found or access denied".to_string()))?;

    Ok(Json(AlertResponse {
        success: true,
        alert,
        message: "Alert status updated successfully".to_string(),
    }))
}
