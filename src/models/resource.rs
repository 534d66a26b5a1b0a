// src/models/resource.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Article,
    Video,
    Pdf,
    Guideline,
    File,
    Gif,
}

/// Represents the 'resources' table: a learning resource of a school.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub tenant_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub kind: ResourceKind,

    /// URL or inline text.
    pub content: String,

    pub tags: Vec<String>,

    /// Only public resources count towards progress.
    pub is_public: bool,

    pub thumbnail: Option<String>,
    /// Seconds, for videos and gifs.
    pub duration_seconds: Option<i32>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'resource_completions' table.
/// Unique on (resource_id, student_id).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCompletion {
    pub id: i64,
    pub resource_id: i64,
    pub student_id: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    /// Seconds.
    pub time_spent: i32,
}

/// Completion joined with the resource it refers to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionView {
    #[serde(flatten)]
    pub completion: ResourceCompletion,
    pub resource: Option<Resource>,
}

/// Insert payload for the store.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub tenant_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: ResourceKind,
    pub content: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub thumbnail: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewCompletion {
    pub resource_id: i64,
    pub student_id: i64,
    pub time_spent: i32,
}

/// DTO for creating a resource. `tags` accepts a list or a comma-separated string.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[validate(length(min = 1, max = 20000, message = "Content is required"))]
    pub content: String,
    #[serde(default)]
    pub tags: Option<Tags>,
    pub is_public: Option<bool>,
    #[validate(custom(function = validate_url))]
    pub thumbnail: Option<String>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
}

/// DTO for updating a resource. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ResourceKind>,
    #[validate(length(min = 1, max = 20000))]
    pub content: Option<String>,
    pub tags: Option<Tags>,
    pub is_public: Option<bool>,
    #[validate(custom(function = validate_url))]
    pub thumbnail: Option<String>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
}

impl UpdateResourceRequest {
    pub fn apply_to(self, resource: &mut Resource) {
        if let Some(title) = self.title {
            resource.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            resource.description = Some(description);
        }
        if let Some(kind) = self.kind {
            resource.kind = kind;
        }
        if let Some(content) = self.content {
            resource.content = content;
        }
        if let Some(tags) = self.tags {
            resource.tags = tags.into_vec();
        }
        if let Some(is_public) = self.is_public {
            resource.is_public = is_public;
        }
        if let Some(thumbnail) = self.thumbnail {
            resource.thumbnail = Some(thumbnail);
        }
        if let Some(duration) = self.duration {
            resource.duration_seconds = Some(duration);
        }
    }
}

/// Tags arrive either as a JSON list or as the legacy comma-separated form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    Csv(String),
}

impl Tags {
    pub fn into_vec(self) -> Vec<String> {
        let raw = match self {
            Tags::List(list) => list,
            Tags::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        let mut tags: Vec<String> = Vec::with_capacity(raw.len());
        for tag in raw {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}

/// DTO for marking a resource as completed.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResourceRequest {
    #[validate(range(min = 0, message = "timeSpent cannot be negative"))]
    #[serde(default)]
    pub time_spent: i32,
}

fn validate_url(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
