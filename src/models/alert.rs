// src/models/alert.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::models::user::Role;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "emergency_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmergencyLevel {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "alert_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Active,
    Resolved,
    Archived,
}

/// Represents the 'alerts' table: an emergency broadcast to some roles.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub tenant_id: i64,
    pub sender_id: i64,
    pub message: String,
    pub target_roles: Json<Vec<Role>>,
    pub emergency_level: EmergencyLevel,
    pub status: AlertStatus,
    pub dismissed: bool,
    /// Set once the notifier accepted the alert.
    pub sent: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAlert {
    pub tenant_id: i64,
    pub sender_id: i64,
    pub message: String,
    pub target_roles: Vec<Role>,
    pub emergency_level: EmergencyLevel,
}

/// DTO for sending an alert.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendAlertRequest {
    #[validate(length(min = 1, max = 2000, message = "Message is required"))]
    pub message: String,
    #[validate(length(min = 1, message = "At least one target role is required"))]
    pub target_roles: Vec<Role>,
    #[serde(default)]
    pub emergency_level: EmergencyLevel,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAlertStatusRequest {
    pub status: AlertStatus,
}

/// Envelope returned by the alert endpoints.
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub success: bool,
    pub alert: Alert,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub success: bool,
    pub count: usize,
    pub alerts: Vec<Alert>,
}
