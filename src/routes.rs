// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::AppError,
    handlers::{
        alert, auth, director, drill, health, message, parent, progress, quiz, resource, student,
        teacher, tenant, user,
    },
    state::AppState,
    utils::jwt::{auth_middleware, director_middleware},
};

/// Assembles the main application router.
///
/// * Public routes: health, login/registration, school and student pickers.
/// * Everything else sits behind `auth_middleware`; `/api/director` also
///   behind `director_middleware`.
/// * Global middleware: Trace, CORS.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/tenants/register", post(tenant::register_school))
        .route("/api/tenants/schools", get(tenant::list_schools))
        .route("/api/students", get(student::list_for_registration));

    let tenant_routes = Router::new().route(
        "/{id}",
        get(tenant::get_tenant).put(tenant::update_tenant),
    );

    let user_routes = Router::new()
        .route("/", get(user::list_users))
        .route("/{id}", get(user::get_user));

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes).post(quiz::create_quiz))
        .route("/{id}", get(quiz::get_quiz).delete(quiz::delete_quiz))
        .route("/{id}/submit", post(quiz::submit_quiz))
        .route("/submissions/{quiz_id}", get(quiz::get_quiz_submissions))
        .route("/leaderboard/{quiz_id}", get(quiz::get_leaderboard));

    let resource_routes = Router::new()
        .route("/", get(resource::list_resources).post(resource::create_resource))
        .route("/completions", get(resource::list_completions))
        .route(
            "/{id}",
            put(resource::update_resource).delete(resource::delete_resource),
        )
        .route("/{id}/complete", post(resource::complete_resource));

    let progress_routes = Router::new()
        .route("/student/{student_id}", get(progress::get_student_progress))
        .route("/class", get(progress::get_class_progress));

    let director_routes = Router::new()
        .route("/stats", get(director::get_stats))
        .route("/analytics", get(director::get_analytics))
        .layer(middleware::from_fn(director_middleware));

    let drill_routes = Router::new()
        .route("/", get(drill::list_drills).post(drill::create_drill))
        .route("/{id}", delete(drill::delete_drill))
        .route("/{id}/status", put(drill::update_drill_status));

    let alert_routes = Router::new()
        .route("/", get(alert::list_alerts).post(alert::send_alert))
        .route("/{id}/dismiss", put(alert::dismiss_alert))
        .route("/{id}/status", put(alert::update_alert_status));

    let message_routes = Router::new()
        .route("/", get(message::list_messages).post(message::send_message))
        .route("/unread-count", get(message::unread_count))
        .route("/conversation/{user_id}", get(message::conversation))
        .route("/{id}/read", put(message::mark_as_read));

    let teacher_routes = Router::new()
        .route("/{id}/dashboard", get(teacher::get_dashboard))
        .route("/{id}/quizzes", get(teacher::get_quizzes))
        .route("/{id}/drills", get(teacher::get_drills))
        .route("/{id}/students", get(teacher::get_students));

    let student_routes = Router::new()
        .route("/{id}", get(student::get_student))
        .route("/{id}/parents", get(student::get_student_parents))
        .route("/{id}/quiz-submissions", get(student::get_student_submissions))
        .route("/{id}/completed-resources", get(student::get_completed_resources))
        .route("/{id}/emergency-contacts", get(student::get_emergency_contacts));

    let parent_routes = Router::new()
        .route("/{id}/student-progress", get(parent::get_student_progress))
        .route("/{id}/emergency-contacts", get(parent::get_emergency_contacts));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .nest("/api/tenants", tenant_routes)
        .nest("/api/users", user_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/resources", resource_routes)
        .nest("/api/progress", progress_routes)
        .nest("/api/director", director_routes)
        .nest("/api/drills", drill_routes)
        .nest("/api/alerts", alert_routes)
        .nest("/api/messages", message_routes)
        .nest("/api/teachers", teacher_routes)
        .nest("/api/students", student_routes)
        .nest("/api/parents", parent_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, notify::LogNotifier, store::MemoryStore};

    fn app() -> Router {
        let config = Config {
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            jwt_expiration: 3600,
            rust_log: "info".to_string(),
            port: 0,
            frontend_url: None,
            seed: None,
        };
        create_router(AppState {
            store: Arc::new(MemoryStore::new()),
            config,
            notifier: Arc::new(LogNotifier),
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let response = app()
            .oneshot(Request::get("/api/quizzes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let response = app()
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
