// src/models/tenant.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::models::user::{ContactPerson, validate_phone};

/// Represents the 'tenants' table: one school or institute.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: i64,

    /// Unique school name.
    pub name: String,
    pub address: String,
    pub contact_email: String,
    pub contact_phone: String,

    /// Stored as a JSON array in the database.
    pub emergency_contacts: Json<Vec<EmergencyContact>>,

    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct EmergencyContact {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(custom(function = validate_phone))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub role: String,
}

/// Public entry of the school picker used during registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolListItem {
    pub id: i64,
    pub name: String,
    pub contact_email: String,
}

impl From<&Tenant> for SchoolListItem {
    fn from(t: &Tenant) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            contact_email: t.contact_email.clone(),
        }
    }
}

/// Insert payload for the store.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub address: String,
    pub contact_email: String,
    pub contact_phone: String,
}

/// DTO for registering a school together with its first director.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSchoolRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "School name is required"))]
    pub school_name: String,
    #[validate(length(min = 1, max = 300))]
    pub address: Option<String>,
    #[validate(custom(function = validate_school_phone))]
    pub contact_phone: Option<String>,
}

/// DTO for updating a tenant. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 300, message = "Address cannot be empty"))]
    pub address: Option<String>,
    #[validate(email(message = "Valid email is required"))]
    pub contact_email: Option<String>,
    #[validate(custom(function = validate_school_phone))]
    pub contact_phone: Option<String>,
    #[validate(nested)]
    pub emergency_contacts: Option<Vec<EmergencyContact>>,
    pub is_active: Option<bool>,
}

impl UpdateTenantRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.contact_email.is_none()
            && self.contact_phone.is_none()
            && self.emergency_contacts.is_none()
            && self.is_active.is_none()
    }

    /// Applies the present fields onto an existing tenant.
    pub fn apply_to(&self, tenant: &mut Tenant) {
        if let Some(name) = &self.name {
            tenant.name = name.trim().to_string();
        }
        if let Some(address) = &self.address {
            tenant.address = address.trim().to_string();
        }
        if let Some(email) = &self.contact_email {
            tenant.contact_email = email.trim().to_lowercase();
        }
        if let Some(phone) = &self.contact_phone {
            tenant.contact_phone = phone.clone();
        }
        if let Some(contacts) = &self.emergency_contacts {
            tenant.emergency_contacts = Json(contacts.clone());
        }
        if let Some(active) = self.is_active {
            tenant.is_active = active;
        }
    }
}

/// School contact phones are 10-15 digits.
fn validate_school_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if !(10..=15).contains(&phone.len()) || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(validator::ValidationError::new("contact_phone_must_be_10_to_15_digits"));
    }
    Ok(())
}

/// Emergency information shown to parents.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyInfo {
    pub emergency_contacts: Vec<EmergencyContact>,
    pub school_info: SchoolInfo,
    pub director: Option<ContactPerson>,
    pub teacher: Option<ContactPerson>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolInfo {
    pub name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
}

impl From<&Tenant> for SchoolInfo {
    fn from(t: &Tenant) -> Self {
        Self {
            name: t.name.clone(),
            contact_email: t.contact_email.clone(),
            contact_phone: t.contact_phone.clone(),
            address: t.address.clone(),
        }
    }
}
