// src/handlers/message.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        message::{MessageListParams, NewMessage, SendMessageRequest},
        user::{Role, User},
    },
    store::DynStore,
    utils::{
        extract::{RequestContext, ValidatedJson},
        html::clean_html,
    },
};

async fn find_member(store: &DynStore, ctx: &RequestContext, id: i64) -> Result<User, AppError> {
    store
        .find_user(id)
        .await?
        .filter(|u| u.tenant_id == ctx.tenant_id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Direct messaging is limited to teacher <-> student pairs of one school.
fn can_message(sender: Role, receiver: Role) -> bool {
    matches!(
        (sender, receiver),
        (Role::Teacher, Role::Student) | (Role::Student, Role::Teacher)
    )
}

pub async fn send_message(
    State(store): State<DynStore>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Teacher, Role::Student])?;

    let receiver = find_member(&store, &ctx, payload.receiver_id)
        .await
        .map_err(|_| AppError::NotFound("Receiver not found".to_string()))?;

    if !can_message(ctx.role, receiver.role) {
        return Err(AppError::Forbidden(
            "Teachers can only message students and students can only message teachers"
                .to_string(),
        ));
    }

    let subject = clean_html(&payload.subject);
    let body = clean_html(&payload.message);
    if subject.is_empty() || body.is_empty() {
        return Err(AppError::BadRequest("Subject and message are required".to_string()));
    }

    let message = store
        .create_message(NewMessage {
            tenant_id: ctx.tenant_id,
            sender_id: ctx.user_id,
            receiver_id: receiver.id,
            subject,
            body,
        })
        .await?;

    tracing::info!(message_id = message.id, sender_id = ctx.user_id, "Message sent");
    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /api/messages?type=sent|received` (received by default).
pub async fn list_messages(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Query(params): Query<MessageListParams>,
) -> Result<impl IntoResponse, AppError> {
    let messages = store
        .list_messages(ctx.tenant_id, ctx.user_id, params.mailbox)
        .await?;
    Ok(Json(messages))
}

/// Only the receiver may mark a message as read.
pub async fn mark_as_read(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let message = store
        .find_message(ctx.tenant_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    if message.receiver_id != ctx.user_id {
        return Err(AppError::Forbidden("Not authorized to update this message".to_string()));
    }

    let message = store.mark_message_read(message.id).await?;
    Ok(Json(message))
}

pub async fn unread_count(
    State(store): State<DynStore>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let count = store.count_unread(ctx.user_id).await?;
    Ok(Json(json!({ "count": count })))
}

/// Messages exchanged with one other member of the school, oldest first.
pub async fn conversation(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let other = find_member(&store, &ctx, user_id).await?;
    let messages = store
        .conversation(ctx.tenant_id, ctx.user_id, other.id)
        .await?;
    Ok(Json(messages))
}
