// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, profile, quiz, school},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, school).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, attempt ledger, mailer).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origins(&state.config.frontend_url))
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/password-reset", post(auth::request_password_reset))
        .route("/password-reset-confirm", post(auth::confirm_password_reset));

    let user_routes = Router::new()
        .route(
            "/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let school_routes = Router::new()
        .route("/leaderboard", get(quiz::get_leaderboard))
        // Protected school routes
        .merge(
            Router::new()
                .route("/active-course-instances", get(school::active_course_instances))
                .route("/active-quizzes", get(school::active_quizzes))
                .route("/questions-by-quiz/{quiz_id}", get(school::questions_by_quiz))
                .route("/topic-text-tasks", get(school::topic_text_tasks))
                .route("/topic-text-tasks/{id}", get(school::text_task))
                .route("/question-feedback", post(school::question_feedback))
                .route("/take-quiz/{quiz_id}", post(quiz::take_quiz))
                .route("/can-submit-quiz/{quiz_id}", get(quiz::can_submit_quiz))
                .route("/quiz-attempts-by-student", get(quiz::attempts_by_student))
                .route("/quiz-attempt/{attempt_id}", get(quiz::attempt_by_id))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/school", school_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// The configured frontend plus the local dev servers.
fn cors_origins(frontend_url: &str) -> Vec<HeaderValue> {
    let mut origins: Vec<HeaderValue> = ["http://localhost:3000", "http://127.0.0.1:3000"]
        .into_iter()
        .map(HeaderValue::from_static)
        .collect();

    let frontend = frontend_url.trim_end_matches('/');
    match HeaderValue::from_str(frontend) {
        Ok(origin) if !origins.contains(&origin) => origins.push(origin),
        Ok(_) => {}
        Err(_) => tracing::warn!("FRONTEND_URL is not a valid origin: {}", frontend_url),
    }
    origins
}
