// src/handlers/director.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{Duration, Utc};

use crate::{
    engine::analytics::{AnalyticsInput, compute_tenant_analytics},
    error::AppError,
    models::{
        progress::{AnalyticsParams, DirectorStats, TimeRange},
        user::{Role, UserFilter},
    },
    store::DynStore,
    utils::extract::RequestContext,
};

/// Headline counters for the director dashboard.
pub async fn get_stats(
    State(store): State<DynStore>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = ctx.tenant_id;

    let stats = DirectorStats {
        total_students: store
            .list_users(&UserFilter::active(tenant_id, Role::Student))
            .await?
            .len(),
        total_teachers: store
            .list_users(&UserFilter::active(tenant_id, Role::Teacher))
            .await?
            .len(),
        total_resources: store.list_resources(tenant_id).await?.len(),
        total_quizzes: store.count_quizzes(tenant_id).await?,
        total_drills: store.list_drills(tenant_id, None).await?.len(),
        active_alerts: store.count_active_alerts(tenant_id).await? as usize,
    };

    Ok(Json(stats))
}

/// `GET /api/director/analytics?timeRange=7days|30days`.
pub async fn get_analytics(
    State(store): State<DynStore>,
    ctx: RequestContext,
    Query(params): Query<AnalyticsParams>,
) -> Result<impl IntoResponse, AppError> {
    let days = TimeRange::parse(params.time_range.as_deref()).days();
    let now = Utc::now();
    let since = now - Duration::days(i64::from(days));
    let tenant_id = ctx.tenant_id;

    let students = store
        .list_users(&UserFilter::active(tenant_id, Role::Student))
        .await?;
    let resources = store.list_resources(tenant_id).await?;
    let quizzes = store.list_quizzes(tenant_id, None).await?;
    let submissions = store.list_tenant_submissions_since(tenant_id, since).await?;
    let completions = store.list_tenant_completions_since(tenant_id, since).await?;
    let active_alerts = store.count_active_alerts(tenant_id).await? as usize;

    let report = compute_tenant_analytics(
        AnalyticsInput {
            students: &students,
            resources: &resources,
            quizzes: &quizzes,
            submissions: &submissions,
            completions: &completions,
            active_alerts,
        },
        days,
        now,
    );

    tracing::debug!(tenant_id, days, "Analytics computed");
    Ok(Json(report))
}
