// src/models/user.rs

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{10}$").expect("phone pattern is valid")
});

/// Role of a member within a school.
/// Stored as the Postgres enum `user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Director,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Director => "director",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "director" => Ok(Role::Director),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub tenant_id: i64,
    pub first_name: String,
    pub last_name: String,

    /// Unique, stored lowercase.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub role: Role,

    /// Required for students.
    pub grade: Option<String>,
    pub phone: Option<String>,

    /// For parents: the linked student.
    pub student_id: Option<i64>,

    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            grade: self.grade.clone(),
        }
    }

    pub fn contact(&self) -> ContactPerson {
        ContactPerson {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Short user representation embedded in progress and leaderboard payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPerson {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Insert payload for the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub tenant_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub grade: Option<String>,
    pub phone: Option<String>,
    pub student_id: Option<i64>,
}

/// Filter for listing users of a tenant.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub tenant_id: i64,
    pub role: Option<Role>,
    /// Only parents linked to this student.
    pub linked_student: Option<i64>,
    pub active_only: bool,
}

impl UserFilter {
    pub fn active(tenant_id: i64, role: Role) -> Self {
        Self {
            tenant_id,
            role: Some(role),
            linked_student: None,
            active_only: true,
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        user.tenant_id == self.tenant_id
            && self.role.is_none_or(|r| user.role == r)
            && self.linked_student.is_none_or(|s| user.student_id == Some(s))
            && (!self.active_only || user.is_active)
    }
}

/// DTO for self-registration of a school member.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be at least 6 characters long"
    ))]
    pub password: String,
    pub role: Role,
    pub tenant_id: i64,
    pub student_id: Option<i64>,
    #[validate(length(max = 20))]
    pub grade: Option<String>,
    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Query parameters for `GET /api/users`.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
}

/// Phone numbers are exactly ten digits.
pub fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if !PHONE_RE.is_match(phone) {
        return Err(validator::ValidationError::new("phone_must_be_10_digits"));
    }
    Ok(())
}

/// Normalizes an e-mail the way it is stored.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
