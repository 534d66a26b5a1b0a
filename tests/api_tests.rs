// tests/api_tests.rs

mod common;

use common::{PASSWORD, spawn_app, unique_email};
use serde_json::{Value, json};

#[tokio::test]
async fn unknown_path_is_404() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/health"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
}

#[tokio::test]
async fn register_login_and_me() {
    // Arrange
    let app = spawn_app().await;
    let director = app.register_school().await;
    let email = unique_email("Teacher");

    // Act: register
    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "firstName": "Tom",
            "lastName": "Teacher",
            "email": email,
            "password": PASSWORD,
            "role": "teacher",
            "tenantId": director.tenant_id,
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert!(body["user"].get("password").is_none());

    // Act: login with the upper-cased address
    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": email.to_uppercase(), "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    let me: Value = app.get("/api/auth/me", &token).await.json().await.unwrap();
    assert_eq!(me["user"]["email"], email.to_lowercase());
    assert_eq!(me["user"]["role"], "teacher");
    assert_eq!(me["user"]["tenantId"], director.tenant_id);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let me: Value = app.get("/api/auth/me", &director.token).await.json().await.unwrap();

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": me["user"]["email"], "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/quizzes"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    let response = app.get("/api/quizzes", "not-a-jwt").await;
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let email = unique_email("dup");

    let payload = json!({
        "firstName": "A",
        "lastName": "B",
        "email": email,
        "password": PASSWORD,
        "role": "teacher",
        "tenantId": director.tenant_id,
    });

    let first = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 400);
}

#[tokio::test]
async fn registration_validates_role_rules() {
    let app = spawn_app().await;
    let director = app.register_school().await;

    let cases = [
        // Directors only come with their school
        json!({ "role": "director" }),
        // Students need a grade
        json!({ "role": "student" }),
        // Parents need a linked student
        json!({ "role": "parent" }),
        // Short password
        json!({ "role": "teacher", "password": "123" }),
        // Unknown school
        json!({ "role": "teacher", "tenantId": 999_999 }),
    ];

    for case in cases {
        let mut payload = json!({
            "firstName": "X",
            "lastName": "Y",
            "email": unique_email("case"),
            "password": PASSWORD,
            "tenantId": director.tenant_id,
        });
        for (k, v) in case.as_object().unwrap() {
            payload[k] = v.clone();
        }

        let response = app
            .client
            .post(app.url("/api/auth/register"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "payload {}", payload);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn school_list_and_student_directory_are_public() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    app.register_student(director.tenant_id).await;

    let schools: Vec<Value> = app
        .client
        .get(app.url("/api/tenants/schools"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(schools.iter().any(|s| s["id"] == director.tenant_id));

    let students: Vec<Value> = app
        .client
        .get(app.url(&format!("/api/students?tenantId={}", director.tenant_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(students.len(), 1);
    assert!(students[0].get("email").is_none());
}

#[tokio::test]
async fn duplicate_school_name_is_rejected() {
    let app = spawn_app().await;
    let payload = |email: String| {
        json!({
            "firstName": "D",
            "lastName": "D",
            "email": email,
            "password": PASSWORD,
            "schoolName": "Riverside High",
        })
    };

    let first = app
        .client
        .post(app.url("/api/tenants/register"))
        .json(&payload(unique_email("d1")))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = app
        .client
        .post(app.url("/api/tenants/register"))
        .json(&payload(unique_email("d2")))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 400);
}

#[tokio::test]
async fn tenants_are_isolated() {
    // Arrange
    let app = spawn_app().await;
    let school_a = app.register_school().await;
    let school_b = app.register_school().await;
    let teacher_a = app.register_teacher(school_a.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher_a, &[0, 1]).await;
    let student_b = app.register_student(school_b.tenant_id).await;

    // Act + Assert: another school's quiz, tenant and student do not exist
    let response = app.get(&format!("/api/quizzes/{}", quiz_id), &school_b.token).await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .get(&format!("/api/tenants/{}", school_a.tenant_id), &school_b.token)
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .get(&format!("/api/students/{}", student_b.id), &school_a.token)
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let quizzes: Vec<Value> = app.get("/api/quizzes", &school_b.token).await.json().await.unwrap();
    assert!(quizzes.is_empty());
}

#[tokio::test]
async fn director_routes_reject_other_roles() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;

    let response = app.get("/api/director/stats", &teacher.token).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app.get("/api/director/stats", &director.token).await;
    assert_eq!(response.status().as_u16(), 200);
    let stats: Value = response.json().await.unwrap();
    assert_eq!(stats["totalTeachers"], 1);
    assert_eq!(stats["totalStudents"], 0);
}

#[tokio::test]
async fn director_updates_own_school() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let path = format!("/api/tenants/{}", director.tenant_id);

    let response = app.put(&path, &teacher.token, json!({ "address": "1 Main St" })).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app.put(&path, &director.token, json!({})).await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app
        .put(
            &path,
            &director.token,
            json!({
                "address": "1 Main St",
                "emergencyContacts": [{ "name": "Fire dept", "phone": "5551234567", "role": "Fire" }],
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["tenant"]["address"], "1 Main St");
    assert_eq!(body["tenant"]["emergencyContacts"][0]["name"], "Fire dept");
}

#[tokio::test]
async fn user_listing_requires_a_role() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    app.register_teacher(director.tenant_id).await;

    let response = app.get("/api/users", &director.token).await;
    assert_eq!(response.status().as_u16(), 400);

    let teachers: Vec<Value> = app
        .get("/api/users?role=teacher", &director.token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(teachers.len(), 1);
}
