// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};

use super::{Store, StoreResult};
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

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a unique-constraint violation to `Conflict`, anything else to 500.
fn conflict_on_unique(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::Conflict(message.to_string());
            }
        }
        tracing::error!("Database write failed: {:?}", e);
        AppError::from(e)
    }
}

const INSERT_USER: &str = r#"
    INSERT INTO users (tenant_id, first_name, last_name, email, password, role, grade, phone, student_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    RETURNING *
"#;

#[async_trait]
impl Store for PgStore {
    async fn create_school(
        &self,
        tenant: NewTenant,
        director: NewUser,
    ) -> StoreResult<(Tenant, User)> {
        let mut tx = self.pool.begin().await?;

        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, address, contact_email, contact_phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&tenant.name)
        .bind(&tenant.address)
        .bind(&tenant.contact_email)
        .bind(&tenant.contact_phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(conflict_on_unique("School with this name already exists"))?;

        let user = sqlx::query_as::<_, User>(INSERT_USER)
            .bind(tenant.id)
            .bind(&director.first_name)
            .bind(&director.last_name)
            .bind(&director.email)
            .bind(&director.password_hash)
            .bind(director.role)
            .bind(&director.grade)
            .bind(&director.phone)
            .bind(director.student_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(conflict_on_unique("User already exists"))?;

        tx.commit().await?;
        Ok((tenant, user))
    }

    async fn find_tenant(&self, id: i64) -> StoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_active_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let rows =
            sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE is_active ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET name = $1, address = $2, contact_email = $3, contact_phone = $4,
                emergency_contacts = $5, is_active = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&tenant.name)
        .bind(&tenant.address)
        .bind(&tenant.contact_email)
        .bind(&tenant.contact_phone)
        .bind(&tenant.emergency_contacts)
        .bind(tenant.is_active)
        .bind(tenant.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique("School with this name already exists"))?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(INSERT_USER)
            .bind(user.tenant_id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.grade)
            .bind(&user.phone)
            .bind(user.student_id)
            .fetch_one(&self.pool)
            .await
            .map_err(conflict_on_unique("User already exists"))
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM users WHERE tenant_id = ");
        builder.push_bind(filter.tenant_id);
        if let Some(role) = filter.role {
            builder.push(" AND role = ").push_bind(role);
        }
        if let Some(student_id) = filter.linked_student {
            builder.push(" AND student_id = ").push_bind(student_id);
        }
        if filter.active_only {
            builder.push(" AND is_active");
        }
        builder.push(" ORDER BY last_name, first_name");

        let rows = builder.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz> {
        let row = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (tenant_id, created_by, title, description, questions, resource_id,
                                 time_limit_minutes, passing_score, category, xp_reward)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(quiz.tenant_id)
        .bind(quiz.created_by)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(Json(&quiz.questions))
        .bind(quiz.resource_id)
        .bind(quiz.time_limit_minutes)
        .bind(quiz.passing_score)
        .bind(quiz.category)
        .bind(quiz.xp_reward)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_quiz(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Quiz>> {
        let row =
            sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1 AND tenant_id = $2")
                .bind(id)
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn list_quizzes(&self, tenant_id: i64, created_by: Option<i64>) -> StoreResult<Vec<Quiz>> {
        let rows = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT * FROM quizzes
            WHERE tenant_id = $1 AND ($2::BIGINT IS NULL OR created_by = $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(tenant_id)
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_quizzes(&self, tenant_id: i64) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn delete_quiz(&self, tenant_id: i64, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM quiz_submissions
            WHERE quiz_id = (SELECT id FROM quizzes WHERE id = $1 AND tenant_id = $2)
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<QuizSubmission> {
        let row = sqlx::query_as::<_, QuizSubmission>(
            r#"
            INSERT INTO quiz_submissions (quiz_id, student_id, answers, score, time_taken)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(submission.quiz_id)
        .bind(submission.student_id)
        .bind(Json(&submission.answers))
        .bind(submission.score)
        .bind(submission.time_taken)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_quiz_submissions(
        &self,
        quiz_id: i64,
        student_id: Option<i64>,
    ) -> StoreResult<Vec<QuizSubmission>> {
        let rows = sqlx::query_as::<_, QuizSubmission>(
            r#"
            SELECT * FROM quiz_submissions
            WHERE quiz_id = $1 AND ($2::BIGINT IS NULL OR student_id = $2)
            ORDER BY completed_at, id
            "#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_student_submissions(&self, student_id: i64) -> StoreResult<Vec<QuizSubmission>> {
        let rows = sqlx::query_as::<_, QuizSubmission>(
            "SELECT * FROM quiz_submissions WHERE student_id = $1 ORDER BY completed_at DESC, id DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_tenant_submissions_since(
        &self,
        tenant_id: i64,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<QuizSubmission>> {
        let rows = sqlx::query_as::<_, QuizSubmission>(
            r#"
            SELECT s.* FROM quiz_submissions s
            JOIN quizzes q ON q.id = s.quiz_id
            WHERE q.tenant_id = $1 AND s.completed_at >= $2
            ORDER BY s.completed_at, s.id
            "#,
        )
        .bind(tenant_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_resource(&self, resource: NewResource) -> StoreResult<Resource> {
        let row = sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (tenant_id, created_by, title, description, kind, content, tags,
                                   is_public, thumbnail, duration_seconds)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(resource.tenant_id)
        .bind(resource.created_by)
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(resource.kind)
        .bind(&resource.content)
        .bind(&resource.tags)
        .bind(resource.is_public)
        .bind(&resource.thumbnail)
        .bind(resource.duration_seconds)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_resource(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Resource>> {
        let row =
            sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1 AND tenant_id = $2")
                .bind(id)
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn list_resources(&self, tenant_id: i64) -> StoreResult<Vec<Resource>> {
        let rows = sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE tenant_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_public_resources(&self, tenant_id: i64) -> StoreResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM resources WHERE tenant_id = $1 AND is_public")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn update_resource(&self, resource: &Resource) -> StoreResult<Resource> {
        sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources
            SET title = $1, description = $2, kind = $3, content = $4, tags = $5,
                is_public = $6, thumbnail = $7, duration_seconds = $8
            WHERE id = $9 AND tenant_id = $10
            RETURNING *
            "#,
        )
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(resource.kind)
        .bind(&resource.content)
        .bind(&resource.tags)
        .bind(resource.is_public)
        .bind(&resource.thumbnail)
        .bind(resource.duration_seconds)
        .bind(resource.id)
        .bind(resource.tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))
    }

    async fn delete_resource(&self, tenant_id: i64, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM resource_completions
            WHERE resource_id = (SELECT id FROM resources WHERE id = $1 AND tenant_id = $2)
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;

        // quizzes.resource_id is ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM resources WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_completion(
        &self,
        completion: NewCompletion,
    ) -> StoreResult<ResourceCompletion> {
        sqlx::query_as::<_, ResourceCompletion>(
            r#"
            INSERT INTO resource_completions (resource_id, student_id, time_spent)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(completion.resource_id)
        .bind(completion.student_id)
        .bind(completion.time_spent)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique("Resource already completed"))
    }

    async fn list_student_completions(
        &self,
        student_id: i64,
    ) -> StoreResult<Vec<ResourceCompletion>> {
        let rows = sqlx::query_as::<_, ResourceCompletion>(
            "SELECT * FROM resource_completions WHERE student_id = $1 ORDER BY completed_at DESC, id DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_tenant_completions_since(
        &self,
        tenant_id: i64,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<ResourceCompletion>> {
        let rows = sqlx::query_as::<_, ResourceCompletion>(
            r#"
            SELECT c.* FROM resource_completions c
            JOIN resources r ON r.id = c.resource_id
            WHERE r.tenant_id = $1 AND c.completed_at >= $2
            ORDER BY c.completed_at, c.id
            "#,
        )
        .bind(tenant_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_drill(&self, drill: NewDrill) -> StoreResult<Drill> {
        let row = sqlx::query_as::<_, Drill>(
            r#"
            INSERT INTO drills (tenant_id, created_by, title, description, scheduled_date, participants)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(drill.tenant_id)
        .bind(drill.created_by)
        .bind(&drill.title)
        .bind(&drill.description)
        .bind(drill.scheduled_date)
        .bind(&drill.participants)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_drills(&self, tenant_id: i64, created_by: Option<i64>) -> StoreResult<Vec<Drill>> {
        let rows = sqlx::query_as::<_, Drill>(
            r#"
            SELECT * FROM drills
            WHERE tenant_id = $1 AND ($2::BIGINT IS NULL OR created_by = $2)
            ORDER BY scheduled_date, id
            "#,
        )
        .bind(tenant_id)
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_drill_status(
        &self,
        tenant_id: i64,
        id: i64,
        status: DrillStatus,
        feedback: Option<String>,
    ) -> StoreResult<Option<Drill>> {
        let row = sqlx::query_as::<_, Drill>(
            r#"
            UPDATE drills SET status = $1, feedback = COALESCE($2, feedback)
            WHERE id = $3 AND tenant_id = $4
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(feedback)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_drill(&self, tenant_id: i64, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM drills WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_alert(&self, alert: NewAlert) -> StoreResult<Alert> {
        let row = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (tenant_id, sender_id, message, target_roles, emergency_level)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(alert.tenant_id)
        .bind(alert.sender_id)
        .bind(&alert.message)
        .bind(Json(&alert.target_roles))
        .bind(alert.emergency_level)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_alerts(&self, tenant_id: i64) -> StoreResult<Vec<Alert>> {
        let rows = sqlx::query_as::<_, Alert>(
            r#"
            SELECT * FROM alerts
            WHERE tenant_id = $1 AND NOT dismissed
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_active_alerts(&self, tenant_id: i64) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM alerts WHERE tenant_id = $1 AND status = 'active' AND NOT dismissed",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    async fn update_alert_status(
        &self,
        tenant_id: i64,
        id: i64,
        status: AlertStatus,
    ) -> StoreResult<Option<Alert>> {
        let row = sqlx::query_as::<_, Alert>(
            "UPDATE alerts SET status = $1 WHERE id = $2 AND tenant_id = $3 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn dismiss_alert(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Alert>> {
        let row = sqlx::query_as::<_, Alert>(
            "UPDATE alerts SET dismissed = TRUE WHERE id = $1 AND tenant_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn mark_alert_sent(&self, id: i64) -> StoreResult<Alert> {
        sqlx::query_as::<_, Alert>("UPDATE alerts SET sent = TRUE WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Alert not found".to_string()))
    }

    async fn create_message(&self, message: NewMessage) -> StoreResult<Message> {
        let row = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (tenant_id, sender_id, receiver_id, subject, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(message.tenant_id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.subject)
        .bind(&message.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_message(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Message>> {
        let row =
            sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1 AND tenant_id = $2")
                .bind(id)
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn list_messages(
        &self,
        tenant_id: i64,
        user_id: i64,
        mailbox: Mailbox,
    ) -> StoreResult<Vec<Message>> {
        let sql = match mailbox {
            Mailbox::Sent => {
                "SELECT * FROM messages WHERE tenant_id = $1 AND sender_id = $2 ORDER BY created_at DESC, id DESC"
            }
            Mailbox::Received => {
                "SELECT * FROM messages WHERE tenant_id = $1 AND receiver_id = $2 ORDER BY created_at DESC, id DESC"
            }
        };
        let rows = sqlx::query_as::<_, Message>(sql)
            .bind(tenant_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn mark_message_read(&self, id: i64) -> StoreResult<Message> {
        sqlx::query_as::<_, Message>(
            r#"
            UPDATE messages SET is_read = TRUE, read_at = COALESCE(read_at, NOW())
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
    }

    async fn count_unread(&self, receiver_id: i64) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND NOT is_read",
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    async fn conversation(&self, tenant_id: i64, a: i64, b: i64) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE tenant_id = $1
              AND ((sender_id = $2 AND receiver_id = $3) OR (sender_id = $3 AND receiver_id = $2))
            ORDER BY created_at, id
            "#,
        )
        .bind(tenant_id)
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
