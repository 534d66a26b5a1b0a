// src/store/memory.rs

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use tokio::sync::RwLock;

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

#[derive(Default)]
struct Tables {
    next_id: i64,
    tenants: BTreeMap<i64, Tenant>,
    users: BTreeMap<i64, User>,
    quizzes: BTreeMap<i64, Quiz>,
    submissions: BTreeMap<i64, QuizSubmission>,
    resources: BTreeMap<i64, Resource>,
    completions: BTreeMap<i64, ResourceCompletion>,
    drills: BTreeMap<i64, Drill>,
    alerts: BTreeMap<i64, Alert>,
    messages: BTreeMap<i64, Message>,
}

impl Tables {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn email_taken(&self, email: &str) -> bool {
        self.users.values().any(|u| u.email == email)
    }

    fn insert_user(&mut self, user: NewUser) -> StoreResult<User> {
        if self.email_taken(&user.email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        let row = User {
            id: self.id(),
            tenant_id: user.tenant_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            grade: user.grade,
            phone: user.phone,
            student_id: user.student_id,
            is_active: true,
            created_at: Utc::now(),
        };
        self.users.insert(row.id, row.clone());
        Ok(row)
    }

    fn tenant_quiz_ids(&self, tenant_id: i64) -> HashSet<i64> {
        self.quizzes
            .values()
            .filter(|q| q.tenant_id == tenant_id)
            .map(|q| q.id)
            .collect()
    }
}

/// Process-local store guarded by a single `RwLock`.
///
/// Writes take the write lock for their whole duration, so cascades and
/// uniqueness checks are atomic with respect to other requests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(rows: impl DoubleEndedIterator<Item = T>) -> Vec<T> {
    rows.rev().collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_school(
        &self,
        tenant: NewTenant,
        director: NewUser,
    ) -> StoreResult<(Tenant, User)> {
        let mut t = self.tables.write().await;
        if t.tenants.values().any(|x| x.name == tenant.name) {
            return Err(AppError::Conflict("School with this name already exists".to_string()));
        }
        if t.email_taken(&director.email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let row = Tenant {
            id: t.id(),
            name: tenant.name,
            address: tenant.address,
            contact_email: tenant.contact_email,
            contact_phone: tenant.contact_phone,
            emergency_contacts: Json(vec![]),
            is_active: true,
            created_at: Utc::now(),
        };
        t.tenants.insert(row.id, row.clone());

        let user = t.insert_user(NewUser {
            tenant_id: row.id,
            ..director
        })?;
        Ok((row, user))
    }

    async fn find_tenant(&self, id: i64) -> StoreResult<Option<Tenant>> {
        Ok(self.tables.read().await.tenants.get(&id).cloned())
    }

    async fn list_active_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Tenant> = t.tenants.values().filter(|x| x.is_active).cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<Tenant> {
        let mut t = self.tables.write().await;
        if t
            .tenants
            .values()
            .any(|x| x.id != tenant.id && x.name == tenant.name)
        {
            return Err(AppError::Conflict("School with this name already exists".to_string()));
        }
        let row = t
            .tenants
            .get_mut(&tenant.id)
            .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
        *row = Tenant {
            id: row.id,
            created_at: row.created_at,
            ..tenant.clone()
        };
        Ok(row.clone())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.tables.write().await.insert_user(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        let mut rows: Vec<User> = t.users.values().filter(|u| filter.matches(u)).cloned().collect();
        rows.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(rows)
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz> {
        let mut t = self.tables.write().await;
        let row = Quiz {
            id: t.id(),
            tenant_id: quiz.tenant_id,
            created_by: quiz.created_by,
            title: quiz.title,
            description: quiz.description,
            questions: Json(quiz.questions),
            resource_id: quiz.resource_id,
            time_limit_minutes: quiz.time_limit_minutes,
            passing_score: quiz.passing_score,
            category: quiz.category,
            xp_reward: quiz.xp_reward,
            created_at: Utc::now(),
        };
        t.quizzes.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_quiz(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Quiz>> {
        let t = self.tables.read().await;
        Ok(t.quizzes.get(&id).filter(|q| q.tenant_id == tenant_id).cloned())
    }

    async fn list_quizzes(&self, tenant_id: i64, created_by: Option<i64>) -> StoreResult<Vec<Quiz>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.quizzes
                .values()
                .filter(|q| q.tenant_id == tenant_id)
                .filter(|q| created_by.is_none_or(|c| q.created_by == c))
                .cloned(),
        ))
    }

    async fn count_quizzes(&self, tenant_id: i64) -> StoreResult<u64> {
        let t = self.tables.read().await;
        Ok(t.quizzes.values().filter(|q| q.tenant_id == tenant_id).count() as u64)
    }

    async fn delete_quiz(&self, tenant_id: i64, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.quizzes.get(&id).is_some_and(|q| q.tenant_id == tenant_id) {
            return Ok(false);
        }
        t.submissions.retain(|_, s| s.quiz_id != id);
        t.quizzes.remove(&id);
        Ok(true)
    }

    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<QuizSubmission> {
        let mut t = self.tables.write().await;
        if !t.quizzes.contains_key(&submission.quiz_id) {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }
        let row = QuizSubmission {
            id: t.id(),
            quiz_id: submission.quiz_id,
            student_id: submission.student_id,
            answers: Json(submission.answers),
            score: submission.score,
            time_taken: submission.time_taken,
            completed_at: Utc::now(),
        };
        t.submissions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_quiz_submissions(
        &self,
        quiz_id: i64,
        student_id: Option<i64>,
    ) -> StoreResult<Vec<QuizSubmission>> {
        let t = self.tables.read().await;
        Ok(t.submissions
            .values()
            .filter(|s| s.quiz_id == quiz_id)
            .filter(|s| student_id.is_none_or(|id| s.student_id == id))
            .cloned()
            .collect())
    }

    async fn list_student_submissions(&self, student_id: i64) -> StoreResult<Vec<QuizSubmission>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.submissions.values().filter(|s| s.student_id == student_id).cloned(),
        ))
    }

    async fn list_tenant_submissions_since(
        &self,
        tenant_id: i64,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<QuizSubmission>> {
        let t = self.tables.read().await;
        let quiz_ids = t.tenant_quiz_ids(tenant_id);
        Ok(t.submissions
            .values()
            .filter(|s| quiz_ids.contains(&s.quiz_id) && s.completed_at >= since)
            .cloned()
            .collect())
    }

    async fn create_resource(&self, resource: NewResource) -> StoreResult<Resource> {
        let mut t = self.tables.write().await;
        let row = Resource {
            id: t.id(),
            tenant_id: resource.tenant_id,
            created_by: resource.created_by,
            title: resource.title,
            description: resource.description,
            kind: resource.kind,
            content: resource.content,
            tags: resource.tags,
            is_public: resource.is_public,
            thumbnail: resource.thumbnail,
            duration_seconds: resource.duration_seconds,
            created_at: Utc::now(),
        };
        t.resources.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_resource(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Resource>> {
        let t = self.tables.read().await;
        Ok(t.resources.get(&id).filter(|r| r.tenant_id == tenant_id).cloned())
    }

    async fn list_resources(&self, tenant_id: i64) -> StoreResult<Vec<Resource>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.resources.values().filter(|r| r.tenant_id == tenant_id).cloned(),
        ))
    }

    async fn count_public_resources(&self, tenant_id: i64) -> StoreResult<u64> {
        let t = self.tables.read().await;
        Ok(t.resources
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.is_public)
            .count() as u64)
    }

    async fn update_resource(&self, resource: &Resource) -> StoreResult<Resource> {
        let mut t = self.tables.write().await;
        let row = t
            .resources
            .get_mut(&resource.id)
            .filter(|r| r.tenant_id == resource.tenant_id)
            .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;
        *row = Resource {
            id: row.id,
            tenant_id: row.tenant_id,
            created_by: row.created_by,
            created_at: row.created_at,
            ..resource.clone()
        };
        Ok(row.clone())
    }

    async fn delete_resource(&self, tenant_id: i64, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.resources.get(&id).is_some_and(|r| r.tenant_id == tenant_id) {
            return Ok(false);
        }
        t.completions.retain(|_, c| c.resource_id != id);
        for quiz in t.quizzes.values_mut() {
            if quiz.resource_id == Some(id) {
                quiz.resource_id = None;
            }
        }
        t.resources.remove(&id);
        Ok(true)
    }

    async fn insert_completion(
        &self,
        completion: NewCompletion,
    ) -> StoreResult<ResourceCompletion> {
        let mut t = self.tables.write().await;
        let duplicate = t.completions.values().any(|c| {
            c.resource_id == completion.resource_id && c.student_id == completion.student_id
        });
        if duplicate {
            return Err(AppError::Conflict("Resource already completed".to_string()));
        }
        let row = ResourceCompletion {
            id: t.id(),
            resource_id: completion.resource_id,
            student_id: completion.student_id,
            completed_at: Utc::now(),
            time_spent: completion.time_spent,
        };
        t.completions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_student_completions(
        &self,
        student_id: i64,
    ) -> StoreResult<Vec<ResourceCompletion>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.completions.values().filter(|c| c.student_id == student_id).cloned(),
        ))
    }

    async fn list_tenant_completions_since(
        &self,
        tenant_id: i64,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<ResourceCompletion>> {
        let t = self.tables.read().await;
        Ok(t.completions
            .values()
            .filter(|c| c.completed_at >= since)
            .filter(|c| {
                t.resources
                    .get(&c.resource_id)
                    .is_some_and(|r| r.tenant_id == tenant_id)
            })
            .cloned()
            .collect())
    }

    async fn create_drill(&self, drill: NewDrill) -> StoreResult<Drill> {
        let mut t = self.tables.write().await;
        let row = Drill {
            id: t.id(),
            tenant_id: drill.tenant_id,
            created_by: drill.created_by,
            title: drill.title,
            description: drill.description,
            scheduled_date: drill.scheduled_date,
            status: DrillStatus::Pending,
            participants: drill.participants,
            feedback: None,
            created_at: Utc::now(),
        };
        t.drills.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_drills(&self, tenant_id: i64, created_by: Option<i64>) -> StoreResult<Vec<Drill>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Drill> = t
            .drills
            .values()
            .filter(|d| d.tenant_id == tenant_id)
            .filter(|d| created_by.is_none_or(|c| d.created_by == c))
            .cloned()
            .collect();
        rows.sort_by_key(|d| d.scheduled_date);
        Ok(rows)
    }

    async fn update_drill_status(
        &self,
        tenant_id: i64,
        id: i64,
        status: DrillStatus,
        feedback: Option<String>,
    ) -> StoreResult<Option<Drill>> {
        let mut t = self.tables.write().await;
        let Some(drill) = t.drills.get_mut(&id).filter(|d| d.tenant_id == tenant_id) else {
            return Ok(None);
        };
        drill.status = status;
        if feedback.is_some() {
            drill.feedback = feedback;
        }
        Ok(Some(drill.clone()))
    }

    async fn delete_drill(&self, tenant_id: i64, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.drills.get(&id).is_some_and(|d| d.tenant_id == tenant_id) {
            return Ok(false);
        }
        t.drills.remove(&id);
        Ok(true)
    }

    async fn create_alert(&self, alert: NewAlert) -> StoreResult<Alert> {
        let mut t = self.tables.write().await;
        let row = Alert {
            id: t.id(),
            tenant_id: alert.tenant_id,
            sender_id: alert.sender_id,
            message: alert.message,
            target_roles: Json(alert.target_roles),
            emergency_level: alert.emergency_level,
            status: AlertStatus::Active,
            dismissed: false,
            sent: false,
            created_at: Utc::now(),
        };
        t.alerts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_alerts(&self, tenant_id: i64) -> StoreResult<Vec<Alert>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.alerts
                .values()
                .filter(|a| a.tenant_id == tenant_id && !a.dismissed)
                .cloned(),
        ))
    }

    async fn count_active_alerts(&self, tenant_id: i64) -> StoreResult<u64> {
        let t = self.tables.read().await;
        Ok(t.alerts
            .values()
            .filter(|a| a.tenant_id == tenant_id && !a.dismissed && a.status == AlertStatus::Active)
            .count() as u64)
    }

    async fn update_alert_status(
        &self,
        tenant_id: i64,
        id: i64,
        status: AlertStatus,
    ) -> StoreResult<Option<Alert>> {
        let mut t = self.tables.write().await;
        Ok(t.alerts
            .get_mut(&id)
            .filter(|a| a.tenant_id == tenant_id)
            .map(|a| {
                a.status = status;
                a.clone()
            }))
    }

    async fn dismiss_alert(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Alert>> {
        let mut t = self.tables.write().await;
        Ok(t.alerts
            .get_mut(&id)
            .filter(|a| a.tenant_id == tenant_id)
            .map(|a| {
                a.dismissed = true;
                a.clone()
            }))
    }

    async fn mark_alert_sent(&self, id: i64) -> StoreResult<Alert> {
        let mut t = self.tables.write().await;
        let alert = t
            .alerts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Alert not found".to_string()))?;
        alert.sent = true;
        Ok(alert.clone())
    }

    async fn create_message(&self, message: NewMessage) -> StoreResult<Message> {
        let mut t = self.tables.write().await;
        let row = Message {
            id: t.id(),
            tenant_id: message.tenant_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            subject: message.subject,
            body: message.body,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        t.messages.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_message(&self, tenant_id: i64, id: i64) -> StoreResult<Option<Message>> {
        let t = self.tables.read().await;
        Ok(t.messages.get(&id).filter(|m| m.tenant_id == tenant_id).cloned())
    }

    async fn list_messages(
        &self,
        tenant_id: i64,
        user_id: i64,
        mailbox: Mailbox,
    ) -> StoreResult<Vec<Message>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.messages
                .values()
                .filter(|m| m.tenant_id == tenant_id)
                .filter(|m| match mailbox {
                    Mailbox::Sent => m.sender_id == user_id,
                    Mailbox::Received => m.receiver_id == user_id,
                })
                .cloned(),
        ))
    }

    async fn mark_message_read(&self, id: i64) -> StoreResult<Message> {
        let mut t = self.tables.write().await;
        let message = t
            .messages
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;
        if !message.is_read {
            message.is_read = true;
            message.read_at = Some(Utc::now());
        }
        Ok(message.clone())
    }

    async fn count_unread(&self, receiver_id: i64) -> StoreResult<u64> {
        let t = self.tables.read().await;
        Ok(t.messages
            .values()
            .filter(|m| m.receiver_id == receiver_id && !m.is_read)
            .count() as u64)
    }

    async fn conversation(&self, tenant_id: i64, a: i64, b: i64) -> StoreResult<Vec<Message>> {
        let t = self.tables.read().await;
        Ok(t.messages
            .values()
            .filter(|m| m.tenant_id == tenant_id)
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b) || (m.sender_id == b && m.receiver_id == a)
            })
            .cloned()
            .collect())
    }
}
