// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use reqwest::{Client, Response};
use safelearn::{
    config::Config, notify::LogNotifier, routes, state::AppState, store::MemoryStore,
};
use serde_json::{Value, json};

pub const PASSWORD: &str = "password123";

/// A running server plus an HTTP client.
pub struct TestApp {
    pub address: String,
    pub client: Client,
}

/// A registered account: token and id.
#[derive(Debug, Clone)]
pub struct Account {
    pub token: String,
    pub id: i64,
    pub tenant_id: i64,
}

/// Spawns the app on a random port, backed by a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
        frontend_url: None,
        seed: None,
    };

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        config,
        notifier: Arc::new(LogNotifier),
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: Client::new(),
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@school.test", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str, token: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, token: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Registers a school and returns its director.
    pub async fn register_school(&self) -> Account {
        let name = format!("School {}", uuid::Uuid::new_v4());
        let response = self
            .client
            .post(self.url("/api/tenants/register"))
            .json(&json!({
                "firstName": "Dana",
                "lastName": "Director",
                "email": unique_email("director"),
                "password": PASSWORD,
                "schoolName": name,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        Account {
            token: body["token"].as_str().unwrap().to_string(),
            id: body["user"]["id"].as_i64().unwrap(),
            tenant_id: body["tenant"]["id"].as_i64().unwrap(),
        }
    }

    /// Registers a member of an existing school. `extra` is merged into the payload.
    pub async fn register_user(&self, tenant_id: i64, role: &str, extra: Value) -> Account {
        let mut payload = json!({
            "firstName": "Test",
            "lastName": role,
            "email": unique_email(role),
            "password": PASSWORD,
            "role": role,
            "tenantId": tenant_id,
        });
        if let (Some(target), Some(fields)) = (payload.as_object_mut(), extra.as_object()) {
            for (k, v) in fields {
                target.insert(k.clone(), v.clone());
            }
        }

        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&payload)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201, "registering a {}", role);

        let body: Value = response.json().await.unwrap();
        Account {
            token: body["token"].as_str().unwrap().to_string(),
            id: body["user"]["id"].as_i64().unwrap(),
            tenant_id,
        }
    }

    pub async fn register_teacher(&self, tenant_id: i64) -> Account {
        self.register_user(tenant_id, "teacher", json!({})).await
    }

    pub async fn register_student(&self, tenant_id: i64) -> Account {
        self.register_user(tenant_id, "student", json!({ "grade": "7" }))
            .await
    }

    pub async fn register_parent(&self, tenant_id: i64, student_id: i64) -> Account {
        self.register_user(tenant_id, "parent", json!({ "studentId": student_id }))
            .await
    }

    /// Creates a quiz whose correct answers are `answers`, four options each.
    pub async fn create_quiz(&self, teacher: &Account, answers: &[i32]) -> i64 {
        let questions: Vec<Value> = answers
            .iter()
            .enumerate()
            .map(|(i, correct)| {
                json!({
                    "question": format!("Question {}", i + 1),
                    "options": ["A", "B", "C", "D"],
                    "correctAnswer": correct,
                })
            })
            .collect();

        let response = self
            .post(
                "/api/quizzes",
                &teacher.token,
                json!({
                    "title": "Earthquake basics",
                    "questions": questions,
                    "category": "earthquake",
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    pub async fn submit_quiz(&self, student: &Account, quiz_id: i64, answers: &[i32]) -> Value {
        let sheet: Vec<Value> = answers
            .iter()
            .map(|a| json!({ "selectedAnswer": a }))
            .collect();
        let response = self
            .post(
                &format!("/api/quizzes/{}/submit", quiz_id),
                &student.token,
                json!({ "answers": sheet, "timeTaken": 60 }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }

    /// Creates a public resource as the director.
    pub async fn create_resource(&self, director: &Account) -> i64 {
        let response = self
            .post(
                "/api/resources",
                &director.token,
                json!({
                    "title": "Fire exits",
                    "type": "article",
                    "content": "Know your nearest exit.",
                    "tags": "fire, safety",
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }
}
