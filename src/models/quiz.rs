// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use url::Url;
use validator::{Validate, ValidationError};

use crate::config::{DEFAULT_PASSING_SCORE, DEFAULT_XP_REWARD};

/// Disaster type a quiz trains for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "quiz_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuizCategory {
    Earthquake,
    Flood,
    Fire,
    Tornado,
    Tsunami,
    #[default]
    General,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    None,
    Gif,
    Image,
    Video,
}

/// Optional illustration attached to a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<i64>,
}

/// One question, embedded in a quiz (not independently addressable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: i32,
    #[serde(default)]
    pub media: Media,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<i32>,
}

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub tenant_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,

    /// Ordered question bank, stored as JSONB.
    pub questions: Json<Vec<Question>>,

    pub resource_id: Option<i64>,
    pub time_limit_minutes: Option<i32>,
    pub passing_score: i32,
    pub category: QuizCategory,
    pub xp_reward: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Quiz {
    pub fn is_passing(&self, score: i32) -> bool {
        score >= self.passing_score
    }

    /// The quiz as shown to students: correct answers are withheld.
    pub fn public_view(&self) -> PublicQuiz {
        PublicQuiz {
            id: self.id,
            tenant_id: self.tenant_id,
            created_by: self.created_by,
            title: self.title.clone(),
            description: self.description.clone(),
            questions: self
                .questions
                .iter()
                .map(|q| PublicQuestion {
                    text: q.text.clone(),
                    options: q.options.clone(),
                    media: q.media.clone(),
                    time_limit_seconds: q.time_limit_seconds,
                })
                .collect(),
            resource_id: self.resource_id,
            time_limit_minutes: self.time_limit_minutes,
            passing_score: self.passing_score,
            category: self.category,
            xp_reward: self.xp_reward,
            created_at: self.created_at,
        }
    }
}

/// DTO for sending a question to a student (excludes the answer key).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub media: Media,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuiz {
    pub id: i64,
    pub tenant_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<PublicQuestion>,
    pub resource_id: Option<i64>,
    pub time_limit_minutes: Option<i32>,
    pub passing_score: i32,
    pub category: QuizCategory,
    pub xp_reward: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for the store.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub tenant_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub resource_id: Option<i64>,
    pub time_limit_minutes: Option<i32>,
    pub passing_score: i32,
    pub category: QuizCategory,
    pub xp_reward: i32,
}

/// DTO for creating a quiz.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<Question>,
    pub resource_id: Option<i64>,
    #[validate(range(min = 1, max = 600))]
    pub time_limit: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i32>,
    pub category: Option<QuizCategory>,
    #[validate(range(min = 0, max = 100000))]
    pub xp_reward: Option<i32>,
}

impl CreateQuizRequest {
    pub fn into_new_quiz(self, tenant_id: i64, created_by: i64) -> NewQuiz {
        NewQuiz {
            tenant_id,
            created_by,
            title: self.title.trim().to_string(),
            description: self.description,
            questions: self.questions,
            resource_id: self.resource_id,
            time_limit_minutes: self.time_limit,
            passing_score: self.passing_score.unwrap_or(DEFAULT_PASSING_SCORE),
            category: self.category.unwrap_or_default(),
            xp_reward: self.xp_reward.unwrap_or(DEFAULT_XP_REWARD),
        }
    }
}

/// Enforces the question-bank invariants: non-empty, at least two options per
/// question, and every answer key pointing inside its own options.
fn validate_questions(questions: &[Question]) -> Result<(), ValidationError> {
    if questions.is_empty() {
        return Err(ValidationError::new("questions_cannot_be_empty"));
    }
    for q in questions {
        if q.text.trim().is_empty() || q.text.len() > 2000 {
            return Err(ValidationError::new("question_text_invalid"));
        }
        if q.options.len() < 2 {
            return Err(ValidationError::new("question_needs_two_options"));
        }
        if q.options.iter().any(|o| o.trim().is_empty() || o.len() > 500) {
            return Err(ValidationError::new("option_invalid"));
        }
        let valid_index = usize::try_from(q.correct_answer)
            .map(|i| i < q.options.len())
            .unwrap_or(false);
        if !valid_index {
            return Err(ValidationError::new("correct_answer_out_of_range"));
        }
        if q.time_limit_seconds.is_some_and(|t| t <= 0) {
            return Err(ValidationError::new("time_limit_must_be_positive"));
        }
        if let Some(url) = &q.media.url {
            if Url::parse(url).is_err() {
                return Err(ValidationError::new("invalid_media_url"));
            }
        }
    }
    Ok(())
}
