// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use lms_backend::{config::Config, routes, services::mailer::MemoryMailer, state::AppState};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub struct TestApp {
    pub address: String,
    pub pool: PgPool,
    pub mailer: Arc<MemoryMailer>,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port against `DATABASE_URL`.
pub async fn spawn_app() -> TestApp {
    // Note: For Postgres, you must have a running database.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        app_port: 0,
        max_quiz_attempts: 3,
        passing_score: 60,
        login_max_failures: 3,
        lockout_minutes: 60,
        password_reset_expiration: 600,
        frontend_url: "http://localhost:3000".to_string(),
    };

    let mailer = Arc::new(MemoryMailer::default());
    let state = AppState::new(pool.clone(), config, mailer.clone());
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        mailer,
        client: reqwest::Client::new(),
    }
}

pub fn unique_email() -> String {
    format!("s_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({
                "email": email,
                "first_name": "Test",
                "last_name": "Student",
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Registers a fresh student and returns its bearer token and email.
    pub async fn student(&self) -> (String, String) {
        let email = unique_email();
        let resp = self.register(&email, "password123").await;
        assert_eq!(resp.status().as_u16(), 201);
        let body: serde_json::Value = resp.json().await.unwrap();
        let token = body["token"].as_str().expect("Token not found").to_string();
        (token, email)
    }

    /// Seeds a quiz with `n` questions, each with one right and one wrong option.
    /// Returns the quiz id and (question, right, wrong) triples.
    pub async fn seed_quiz(&self, n: usize) -> (i64, Vec<(i64, i64, i64)>) {
        let quiz_id: i64 = sqlx::query_scalar(
            "INSERT INTO quizzes (title, is_active) VALUES ($1, TRUE) RETURNING id",
        )
        .bind(format!("Quiz {}", uuid::Uuid::new_v4()))
        .fetch_one(&self.pool)
        .await
        .unwrap();

        let mut questions = Vec::new();
        for i in 0..n {
            let q: i64 = sqlx::query_scalar(
                "INSERT INTO questions (quiz_id, text) VALUES ($1, $2) RETURNING id",
            )
            .bind(quiz_id)
            .bind(format!("Question {}", i))
            .fetch_one(&self.pool)
            .await
            .unwrap();

            let mut ids = Vec::new();
            for (text, correct) in [("right", true), ("wrong", false)] {
                let a: i64 = sqlx::query_scalar(
                    "INSERT INTO answers (question_id, text, is_correct) VALUES ($1, $2, $3) RETURNING id",
                )
                .bind(q)
                .bind(text)
                .bind(correct)
                .fetch_one(&self.pool)
                .await
                .unwrap();
                ids.push(a);
            }
            questions.push((q, ids[0], ids[1]));
        }

        (quiz_id, questions)
    }

    pub async fn take_quiz(
        &self,
        token: &str,
        quiz_id: i64,
        answers: &[(i64, i64)],
    ) -> reqwest::Response {
        let answers: Vec<serde_json::Value> = answers
            .iter()
            .map(|(q, a)| serde_json::json!({ "question_id": q, "answer_id": a }))
            .collect();

        self.client
            .post(self.url(&format!("/api/school/take-quiz/{}", quiz_id)))
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({ "answers": answers }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn attempt_count(&self, email: &str, quiz_id: i64) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM quiz_attempts a JOIN users u ON u.id = a.student_id
             WHERE u.email = $1 AND a.quiz_id = $2",
        )
        .bind(email)
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }
}
