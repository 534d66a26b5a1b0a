// tests/quiz_flow_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

#[tokio::test]
async fn submission_is_graded_per_question() {
    // Arrange
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let student = app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher, &[0, 1, 2, 3]).await;

    // Act
    let result = app.submit_quiz(&student, quiz_id, &[0, 1, 2, 2]).await;

    // Assert
    assert_eq!(result["score"], 75);
    assert_eq!(result["correctCount"], 3);
    assert_eq!(result["totalQuestions"], 4);
    assert_eq!(result["passed"], true);

    let flags: Vec<bool> = result["answers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["isCorrect"].as_bool().unwrap())
        .collect();
    assert_eq!(flags, vec![true, true, true, false]);
}

#[tokio::test]
async fn unanswered_and_missing_questions_count_as_wrong() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let student = app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher, &[0, 1, 2]).await;

    let response = app
        .post(
            &format!("/api/quizzes/{}/submit", quiz_id),
            &student.token,
            json!({ "answers": [{ "selectedAnswer": 0 }, {}], "timeTaken": 30 }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let result: Value = response.json().await.unwrap();
    // 1 of 3 rounds half-up to 33
    assert_eq!(result["score"], 33);
    assert_eq!(result["answers"].as_array().unwrap().len(), 3);
    assert_eq!(result["answers"][1]["selectedAnswer"], Value::Null);
    assert_eq!(result["passed"], false);
}

#[tokio::test]
async fn non_array_answers_are_rejected() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let student = app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher, &[0, 1]).await;

    let response = app
        .post(
            &format!("/api/quizzes/{}/submit", quiz_id),
            &student.token,
            json!({ "answers": "0,1", "timeTaken": 10 }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let submissions: Vec<Value> = app
        .get(&format!("/api/quizzes/submissions/{}", quiz_id), &teacher.token)
        .await
        .json()
        .await
        .unwrap();
    assert!(submissions.is_empty());
}

#[tokio::test]
async fn students_never_see_answer_keys() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let student = app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher, &[2, 3]).await;

    let quiz: Value = app
        .get(&format!("/api/quizzes/{}", quiz_id), &student.token)
        .await
        .json()
        .await
        .unwrap();
    for question in quiz["questions"].as_array().unwrap() {
        assert!(question.get("correctAnswer").is_none());
    }

    let list: Vec<Value> = app.get("/api/quizzes", &student.token).await.json().await.unwrap();
    assert!(list[0]["questions"][0].get("correctAnswer").is_none());

    let quiz: Value = app
        .get(&format!("/api/quizzes/{}", quiz_id), &teacher.token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["questions"][0]["correctAnswer"], 2);
}

#[tokio::test]
async fn only_teachers_create_and_only_students_submit() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let student = app.register_student(director.tenant_id).await;

    let response = app
        .post(
            "/api/quizzes",
            &student.token,
            json!({
                "title": "Nope",
                "questions": [{ "question": "Q", "options": ["a", "b"], "correctAnswer": 0 }],
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 403);

    let quiz_id = app.create_quiz(&teacher, &[1]).await;
    let response = app
        .post(
            &format!("/api/quizzes/{}/submit", quiz_id),
            &teacher.token,
            json!({ "answers": [{ "selectedAnswer": 1 }] }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn quiz_with_invalid_answer_key_is_rejected() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;

    let response = app
        .post(
            "/api/quizzes",
            &teacher.token,
            json!({
                "title": "Broken",
                "questions": [{ "question": "Q", "options": ["a", "b"], "correctAnswer": 5 }],
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app
        .post("/api/quizzes", &teacher.token, json!({ "title": "Empty", "questions": [] }))
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn leaderboard_ranks_best_score_then_earliest_attempt() {
    // Arrange
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let first = app.register_student(director.tenant_id).await;
    let second = app.register_student(director.tenant_id).await;
    let third = app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher, &[0, 1]).await;

    // Act
    app.submit_quiz(&third, quiz_id, &[0, 0]).await; // 50
    app.submit_quiz(&first, quiz_id, &[0, 1]).await; // 100
    app.submit_quiz(&second, quiz_id, &[0, 1]).await; // 100
    app.submit_quiz(&third, quiz_id, &[1, 1]).await; // 50 again

    let board: Vec<Value> = app
        .get(&format!("/api/quizzes/leaderboard/{}", quiz_id), &teacher.token)
        .await
        .json()
        .await
        .unwrap();

    // Assert
    let order: Vec<i64> = board.iter().map(|e| e["studentId"].as_i64().unwrap()).collect();
    assert_eq!(order, vec![first.id, second.id, third.id]);
    assert_eq!(board[0]["bestScore"], 100);
    assert_eq!(board[2]["bestScore"], 50);
    assert_eq!(board[2]["attempts"], 2);
}

#[tokio::test]
async fn students_only_see_their_own_submissions() {
    let app = spawn_app().await;
    let director = app.register_school().await;
    let teacher = app.register_teacher(director.tenant_id).await;
    let alice = app.register_student(director.tenant_id).await;
    let bob = app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&teacher, &[0]).await;

    app.submit_quiz(&alice, quiz_id, &[0]).await;
    app.submit_quiz(&bob, quiz_id, &[1]).await;

    let path = format!("/api/quizzes/submissions/{}", quiz_id);
    let own: Vec<Value> = app.get(&path, &alice.token).await.json().await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["studentId"], alice.id);

    let all: Vec<Value> = app.get(&path, &teacher.token).await.json().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn only_the_creator_deletes_a_quiz_and_submissions_go_with_it() {
    // Arrange
    let app = spawn_app().await;
    let director = app.register_school().await;
    let owner = app.register_teacher(director.tenant_id).await;
    let other = app.register_teacher(director.tenant_id).await;
    let student = app.register_student(director.tenant_id).await;
    let quiz_id = app.create_quiz(&owner, &[0, 1]).await;
    app.submit_quiz(&student, quiz_id, &[0, 1]).await;

    // Act + Assert
    let response = app.delete(&format!("/api/quizzes/{}", quiz_id), &other.token).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app.delete(&format!("/api/quizzes/{}", quiz_id), &owner.token).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .get(&format!("/api/quizzes/leaderboard/{}", quiz_id), &owner.token)
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let submissions: Vec<Value> = app
        .get(&format!("/api/students/{}/quiz-submissions", student.id), &owner.token)
        .await
        .json()
        .await
        .unwrap();
    assert!(submissions.is_empty());
}
