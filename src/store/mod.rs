// src/store/mod.rs

//! Persistence seam.
//!
//! Handlers only talk to [`Store`]. `PgStore` backs production; `MemoryStore`
//! runs local development without a database and the integration tests.
//! Every lookup that can cross a school boundary takes the caller's
//! `tenant_id` and returns `None` for foreign rows.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        alert::{Alert, AlertStatus, NewAlert},
        drill::{Drill, DrillStatus, NewDrill},
        message::{Mailbox, Message, NewMessage},
        quiz::{NewQuiz, Quiz},
        resource::{NewCompletion, NewResource, Resource, ResourceCompletion},
        submission::{NewSubmission, QuizSubmission},
        tenant::{NewTenant, Tenant},
        user::{NewUser, User, UserFilter},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DynStore = Arc<dyn Store>;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait Store: Send + Sync {
    // --- Tenants ---

    /// Creates the school and its first director in one atomic step.
    /// `director.tenant_id` is ignored and replaced by the new tenant's id.
    /// Duplicate school name or director e-mail -> `Conflict`.
    async fn create_school(&self, tenant: NewTenant, director: NewUser)
    -> StoreResult<(Tenant, User)>;

    async fn find_tenant(&self, id: i64) -> StoreResult<Option<Tenant>>;

    /// Active tenants ordered by name.
    async fn list_active_tenants(&self) -> StoreResult<Vec<Tenant>>;

    /// Persists the mutable fields of `tenant`. Missing row -> `NotFound`.
    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<Tenant>;

    // --- Users ---

    /// Duplicate e-mail -> `Conflict`.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;

    /// `email` must already be normalized.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Users matching `filter`, ordered by last then first name.
    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>>;

    // --- Quizzes ---

    async fn create_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz>;

    async fn find_quiz(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Quiz>>;

    /// Newest first, optionally restricted to one creator.
    async fn list_quizzes(&self, tenant_id: i64, created_by: Option<i64>)
    -> StoreResult<Vec<Quiz>>;

    async fn count_quizzes(&self, tenant_id: i64) -> StoreResult<u64>;

    /// Deletes the quiz together with all of its submissions.
    /// Returns `false` when no such quiz exists in the tenant.
    async fn delete_quiz(&self, tenant_id: i64, id: i64) -> StoreResult<bool>;

    // --- Submissions ---

    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<QuizSubmission>;

    /// Oldest first.
    async fn list_quiz_submissions(
        &self,
        quiz_id: i64,
        student_id: Option<i64>,
    ) -> StoreResult<Vec<QuizSubmission>>;

    /// Newest first.
    async fn list_student_submissions(&self, student_id: i64) -> StoreResult<Vec<QuizSubmission>>;

    /// Submissions to any quiz of the tenant completed at or after `since`.
    async fn list_tenant_submissions_since(
        &self,
        tenant_id: i64,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<QuizSubmission>>;

    // --- Resources ---

    async fn create_resource(&self, resource: NewResource) -> StoreResult<Resource>;

    async fn find_resource(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Resource>>;

    /// Newest first.
    async fn list_resources(&self, tenant_id: i64) -> StoreResult<Vec<Resource>>;

    async fn count_public_resources(&self, tenant_id: i64) -> StoreResult<u64>;

    /// Persists the mutable fields of `resource`. Missing row -> `NotFound`.
    async fn update_resource(&self, resource: &Resource) -> StoreResult<Resource>;

    /// Deletes the resource together with all of its completions.
    async fn delete_resource(&self, tenant_id: i64, id: i64) -> StoreResult<bool>;

    // --- Completions ---

    /// At most one completion per (resource, student); a second one fails
    /// with `Conflict` and leaves the stored row untouched.
    async fn insert_completion(&self, completion: NewCompletion)
    -> StoreResult<ResourceCompletion>;

    /// Newest first.
    async fn list_student_completions(
        &self,
        student_id: i64,
    ) -> StoreResult<Vec<ResourceCompletion>>;

    async fn list_tenant_completions_since(
        &self,
        tenant_id: i64,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<ResourceCompletion>>;

    // --- Drills ---

    async fn create_drill(&self, drill: NewDrill) -> StoreResult<Drill>;

    /// Ordered by scheduled date.
    async fn list_drills(&self, tenant_id: i64, created_by: Option<i64>) -> StoreResult<Vec<Drill>>;

    async fn update_drill_status(
        &self,
        tenant_id: i64,
        id: i64,
        status: DrillStatus,
        feedback: Option<String>,
    ) -> StoreResult<Option<Drill>>;

    async fn delete_drill(&self, tenant_id: i64, id: i64) -> StoreResult<bool>;

    // --- Alerts ---

    async fn create_alert(&self, alert: NewAlert) -> StoreResult<Alert>;

    /// Non-dismissed alerts, newest first.
    async fn list_alerts(&self, tenant_id: i64) -> StoreResult<Vec<Alert>>;

    /// Alerts that are active and not dismissed.
    async fn count_active_alerts(&self, tenant_id: i64) -> StoreResult<u64>;

    async fn update_alert_status(
        &self,
        tenant_id: i64,
        id: i64,
        status: AlertStatus,
    ) -> StoreResult<Option<Alert>>;

    async fn dismiss_alert(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Alert>>;

    async fn mark_alert_sent(&self, id: i64) -> StoreResult<Alert>;

    // --- Messages ---

    async fn create_message(&self, message: NewMessage) -> StoreResult<Message>;

    async fn find_message(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Message>>;

    /// Newest first.
    async fn list_messages(
        &self,
        tenant_id: i64,
        user_id: i64,
        mailbox: Mailbox,
    ) -> StoreResult<Vec<Message>>;

    /// Sets `is_read` and stamps `read_at` on first read.
    async fn mark_message_read(&self, id: i64) -> StoreResult<Message>;

    async fn count_unread(&self, receiver_id: i64) -> StoreResult<u64>;

    /// Messages exchanged between two users, oldest first.
    async fn conversation(&self, tenant_id: i64, a: i64, b: i64) -> StoreResult<Vec<Message>>;
}
