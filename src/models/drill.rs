// src/models/drill.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "drill_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DrillStatus {
    #[default]
    Pending,
    Completed,
}

/// Represents the 'drills' table: a scheduled safety drill.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drill {
    pub id: i64,
    pub tenant_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: chrono::DateTime<chrono::Utc>,
    pub status: DrillStatus,
    /// User ids taking part.
    pub participants: Vec<i64>,
    pub feedback: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDrill {
    pub tenant_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: chrono::DateTime<chrono::Utc>,
    pub participants: Vec<i64>,
}

/// DTO for scheduling a drill.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDrillRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub scheduled_date: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub participants: Vec<i64>,
}

/// DTO for `PUT /api/drills/{id}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDrillStatusRequest {
    pub status: DrillStatus,
    #[validate(length(max = 5000))]
    pub feedback: Option<String>,
}
