// src/handlers/resource.rs

use std::collections::HashMap;

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
        resource::{
            CompleteResourceRequest, CompletionView, CreateResourceRequest, NewCompletion,
            NewResource, ResourceCompletion, UpdateResourceRequest,
        },
        user::Role,
    },
    store::DynStore,
    utils::{
        extract::{RequestContext, ValidatedJson},
        html::clean_optional,
    },
};

/// Joins completions with the tenant's resources. Completions of resources
/// outside the tenant keep `resource: None`.
pub(crate) async fn completion_views(
    store: &DynStore,
    tenant_id: i64,
    completions: Vec<ResourceCompletion>,
) -> Result<Vec<CompletionView>, AppError> {
    let resources: HashMap<i64, _> = store
        .list_resources(tenant_id)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    Ok(completions
        .into_iter()
        .map(|completion| CompletionView {
            resource: resources.get(&completion.resource_id).cloned(),
            completion,
        })
        .collect())
}

pub async fn list_resources(
    State(store): State<DynStore>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let resources = store.list_resources(ctx.tenant_id).await?;
    Ok(Json(resources))
}

/// Director only.
pub async fn create_resource(
    State(store): State<DynStore>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Director])?;

    let resource = store
        .create_resource(NewResource {
            tenant_id: ctx.tenant_id,
            created_by: ctx.user_id,
            title: payload.title.trim().to_string(),
            description: clean_optional(payload.description.as_deref()),
            kind: payload.kind,
            content: payload.content,
            tags: payload.tags.map(|t| t.into_vec()).unwrap_or_default(),
            is_public: payload.is_public.unwrap_or(true),
            thumbnail: payload.thumbnail,
            duration_seconds: payload.duration,
        })
        .await?;

    tracing::info!(resource_id = resource.id, tenant_id = ctx.tenant_id, "Resource created");
    Ok((StatusCode::CREATED, Json(resource)))
}

/// Director only.
pub async fn update_resource(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Director])?;

    let mut resource = store
        .find_resource(ctx.tenant_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found or access denied".to_string()))?;

    payload.apply_to(&mut resource);
    resource.description = clean_optional(resource.description.as_deref());

    let resource = store.update_resource(&resource).await?;
    Ok(Json(resource))
}

/// Deletes a resource and its completions. Director only.
pub async fn delete_resource(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Director])?;

    if !store.delete_resource(ctx.tenant_id, id).await? {
        return Err(AppError::NotFound("Resource not found or access denied".to_string()));
    }
    tracing::info!(resource_id = id, "Resource deleted");

    Ok(Json(json!({ "success": true, "message": "Resource deleted successfully" })))
}

/// Marks a resource as completed by the calling student.
/// A second completion of the same resource is rejected.
pub async fn complete_resource(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CompleteResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require_role(&[Role::Student])?;

    let resource = store
        .find_resource(ctx.tenant_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    let completion = store
        .insert_completion(NewCompletion {
            resource_id: resource.id,
            student_id: ctx.user_id,
            time_spent: payload.time_spent,
        })
        .await?;

    tracing::info!(resource_id = resource.id, student_id = ctx.user_id, "Resource completed");
    Ok((StatusCode::CREATED, Json(completion)))
}

/// Completions of the calling user.
pub async fn list_completions(
    State(store): State<DynStore>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let completions = store.list_student_completions(ctx.user_id).await?;
    let views = completion_views(&store, ctx.tenant_id, completions).await?;
    Ok(Json(views))
}
