// tests/progress_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

#[tokio::test]
async fn empty_school_reports_zero_progress() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let student = app.register_student(director.tenant_id).await;

    let report: Value = app
        .get(&format!("/api/progress/student/{}", student.id), &student.token)
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(
        report["progress"],
        json!({ "overall": 0, "quizzes": 0, "resources": 0, "averageScore": 0 })
    );
    assert_eq!(report["student"]["id"], student.id);
}

#[tokio::test]
async fn progress_combines_quizzes_and_resources() {
    // Arrange: 10 quizzes, 2 public resources
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let student = app.register_student(director.tenant_id).await;

    let mut quiz_ids = Vec::new();
    for _ in 0..10 {
        quiz_ids.push(app.create_quiz(&teacher, &[0, 1]).await);
    }
    let resource_id = app.create_resource(&director).await;
    app.create_resource(&director).await;

    // Act: 4 submissions (scores 100, 100, 50, 0) and 1 completion
    app.submit_quiz(&student, quiz_ids[0], &[0, 1]).await;
    app.submit_quiz(&student, quiz_ids[1], &[0, 1]).await;
    app.submit_quiz(&student, quiz_ids[2], &[0, 0]).await;
    app.submit_quiz(&student, quiz_ids[3], &[1, 0]).await;
    let response = app
        .post(
            &format!("/api/resources/{}/complete", resource_id),
            &student.token,
            json!({ "timeSpent": 120 }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    // Assert
    let report: Value = app
        .get(&format!("/api/progress/student/{}", student.id), &teacher.token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(report["progress"]["quizzes"], 40);
    assert_eq!(report["progress"]["resources"], 50);
    assert_eq!(report["progress"]["overall"], 45);
    assert_eq!(report["progress"]["averageScore"], 63);
    assert_eq!(report["quizSubmissions"].as_array().unwrap().len(), 4);
    assert_eq!(report["resourceCompletions"][0]["resource"]["id"], resource_id);
}

#[tokio::test]
async fn retakes_count_as_completed_quizzes() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let student = app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher, &[0]).await;

    app.submit_quiz(&student, quiz_id, &[0]).await;
    app.submit_quiz(&student, quiz_id, &[0]).await;

    let report: Value = app
        .get(&format!("/api/progress/student/{}", student.id), &student.token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(report["progress"]["quizzes"], 200);
}

#[tokio::test]
async fn completing_a_resource_twice_is_rejected() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let student = app.register_student(director.tenant_id).await;
    let resource_id = app.create_resource(&director).await;
    let path = format!("/api/resources/{}/complete", resource_id);

    let first = app.post(&path, &student.token, json!({ "timeSpent": 30 })).await;
    assert_eq!(first.status().as_u16(), 201);

    let second = app.post(&path, &student.token, json!({ "timeSpent": 30 })).await;
    assert_eq!(second.status().as_u16(), 400);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["success"], false);

    let completions: Vec<Value> = app
        .get("/api/resources/completions", &student.token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(completions.len(), 1);
}

#[tokio::test]
async fn progress_visibility_follows_roles() {
    // Arrange
    let app = spawn_app().await;
    let director = app.register_school().await;
    let alice = app.register_student(director.tenant_id).await;
    let bob = app.register_student(director.tenant_id).await;
    let parent = app.register_parent(director.tenant_id, alice.id).await;

    let alice_path = format!("/api/progress/student/{}", alice.id);
    let bob_path = format!("/api/progress/student/{}", bob.id);

    // Students see only themselves
    assert_eq!(app.get(&alice_path, &alice.token).await.status().as_u16(), 200);
    assert_eq!(app.get(&bob_path, &alice.token).await.status().as_u16(), 403);

    // Parents see only their linked student
    assert_eq!(app.get(&alice_path, &parent.token).await.status().as_u16(), 200);
    assert_eq!(app.get(&bob_path, &parent.token).await.status().as_u16(), 403);

    // Directors see everyone
    assert_eq!(app.get(&bob_path, &director.token).await.status().as_u16(), 200);

    // Parent shortcut
    let report: Value = app
        .get(&format!("/api/parents/{}/student-progress", parent.id), &parent.token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(report["student"]["id"], alice.id);

    let response = app
        .get(&format!("/api/parents/{}/student-progress", parent.id), &alice.token)
        .await;
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn class_progress_is_for_teachers() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let student = app.register_student(director.tenant_id).await;
    app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher, &[0]).await;
    app.submit_quiz(&student, quiz_id, &[0]).await;

    let response = app.get("/api/progress/class", &student.token).await;
    assert_eq!(response.status().as_u16(), 403);

    let rows: Vec<Value> = app
        .get("/api/progress/class", &teacher.token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    let row = rows
        .iter()
        .find(|r| r["student"]["id"] == student.id)
        .unwrap();
    assert_eq!(row["completedQuizzes"], 1);
    assert_eq!(row["progress"]["quizzes"], 100);
    assert_eq!(row["progress"]["overall"], 50);
}

#[tokio::test]
async fn analytics_reports_the_requested_window() {
    // Arrange
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let active = app.register_student(director.tenant_id).await;
    app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher, &[0, 1]).await;
    let resource_id = app.create_resource(&director).await;

    app.submit_quiz(&active, quiz_id, &[0, 1]).await;
    app.post(
        &format!("/api/resources/{}/complete", resource_id),
        &active.token,
        json!({}),
    )
    .await;

    // Act
    let week: Value = app
        .get("/api/director/analytics", &director.token)
        .await
        .json()
        .await
        .unwrap();
    let month: Value = app
        .get("/api/director/analytics?timeRange=30days", &director.token)
        .await
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(week["userActivity"].as_array().unwrap().len(), 7);
    assert_eq!(month["userActivity"].as_array().unwrap().len(), 30);

    let today = week["userActivity"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(today["activeUsers"], 1);
    assert_eq!(today["newRegistrations"], 2);

    assert_eq!(week["resourceUsage"][0]["resourceId"], resource_id);
    assert_eq!(week["resourceUsage"][0]["completions"], 1);
    assert_eq!(week["resourceUsage"][0]["completionRate"], 50);

    assert_eq!(week["quizPerformance"][0]["quizId"], quiz_id);
    assert_eq!(week["quizPerformance"][0]["averageScore"], 100);
    assert_eq!(week["quizPerformance"][0]["totalQuestions"], 2);

    let metrics = &week["systemMetrics"];
    assert_eq!(metrics["totalUsers"], 2);
    assert_eq!(metrics["totalResources"], 1);
    assert_eq!(metrics["totalCompletions"], 1);
    assert_eq!(metrics["avgQuizScore"], 100);
    assert_eq!(metrics["engagementRate"], 50);
}
