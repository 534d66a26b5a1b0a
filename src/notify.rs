// src/notify.rs

//! Alert dispatch.

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{alert::Alert, user::User},
};

/// Delivers an alert to its recipients (e-mail, push, ...).
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn dispatch(&self, alert: &Alert, recipients: &[User]) -> Result<(), AppError>;
}

/// Writes every dispatch to the log instead of contacting an external service.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl AlertNotifier for LogNotifier {
    async fn dispatch(&self, alert: &Alert, recipients: &[User]) -> Result<(), AppError> {
        tracing::info!(
            alert_id = alert.id,
            tenant_id = alert.tenant_id,
            level = ?alert.emergency_level,
            recipients = recipients.len(),
            "Dispatching alert"
        );
        for user in recipients {
            tracing::debug!(alert_id = alert.id, email = %user.email, "Alert recipient");
        }
        Ok(())
    }
}
