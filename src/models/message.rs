// src/models/message.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'messages' table: direct teacher/student messages.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub tenant_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub subject: String,
    #[serde(rename = "message")]
    pub body: String,
    pub is_read: bool,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub tenant_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub subject: String,
    pub body: String,
}

/// Which side of the mailbox to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mailbox {
    Sent,
    #[default]
    Received,
}

#[derive(Debug, Deserialize)]
pub struct MessageListParams {
    #[serde(rename = "type", default)]
    pub mailbox: Mailbox,
}

/// DTO for sending a message.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: i64,
    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, max = 10000, message = "Message is required"))]
    pub message: String,
}
