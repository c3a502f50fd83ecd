// tests/school_tests.rs

mod common;

use common::spawn_app;

/// Seeds an active course with one instance, one topic holding a quiz and a
/// text task. Returns (course, topic, quiz, task) ids.
async fn seed_course(pool: &sqlx::PgPool, is_active: bool) -> (i64, i64, i64, i64) {
    let tag = uuid::Uuid::new_v4();

    let course: i64 = sqlx::query_scalar(
        "INSERT INTO courses (title, description, is_active) VALUES ($1, 'Intro', $2) RETURNING id",
    )
    .bind(format!("Course {}", tag))
    .bind(is_active)
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query("INSERT INTO course_instances (course_id, year, semester) VALUES ($1, 2024, 'spring')")
        .bind(course)
        .execute(pool)
        .await
        .unwrap();

    let topic: i64 = sqlx::query_scalar(
        "INSERT INTO topics (course_id, title) VALUES ($1, $2) RETURNING id",
    )
    .bind(course)
    .bind(format!("Topic {}", tag))
    .fetch_one(pool)
    .await
    .unwrap();

    let quiz: i64 = sqlx::query_scalar(
        "INSERT INTO quizzes (topic_id, title) VALUES ($1, $2) RETURNING id",
    )
    .bind(topic)
    .bind(format!("Quiz {}", tag))
    .fetch_one(pool)
    .await
    .unwrap();

    let task: i64 = sqlx::query_scalar(
        "INSERT INTO topic_text_tasks (topic_id, title, content) VALUES ($1, 'Essay', 'Explain ownership') RETURNING id",
    )
    .bind(topic)
    .fetch_one(pool)
    .await
    .unwrap();

    (course, topic, quiz, task)
}

#[tokio::test]
async fn active_course_instances_nest_topics_and_quizzes() {
    let app = spawn_app().await;
    let (token, _) = app.student().await;
    let (course, topic, quiz, _) = seed_course(&app.pool, true).await;
    let (hidden_course, _, _, _) = seed_course(&app.pool, false).await;

    let instances: Vec<serde_json::Value> = app
        .client
        .get(app.url("/api/school/active-course-instances"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let instance = instances
        .iter()
        .find(|i| i["course"]["id"] == course)
        .expect("Active course missing");
    assert_eq!(instance["semester"], "spring");
    assert_eq!(instance["topics"][0]["id"], topic);
    assert_eq!(instance["topics"][0]["quizzes"][0]["id"], quiz);

    assert!(instances.iter().all(|i| i["course"]["id"] != hidden_course));
}

#[tokio::test]
async fn inactive_quizzes_are_not_listed() {
    let app = spawn_app().await;
    let (token, _) = app.student().await;
    let (active, _) = app.seed_quiz(1).await;
    let (inactive, _) = app.seed_quiz(1).await;
    sqlx::query("UPDATE quizzes SET is_active = FALSE WHERE id = $1")
        .bind(inactive)
        .execute(&app.pool)
        .await
        .unwrap();

    let quizzes: Vec<serde_json::Value> = app
        .client
        .get(app.url("/api/school/active-quizzes"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(quizzes.iter().any(|q| q["id"] == active));
    assert!(quizzes.iter().all(|q| q["id"] != inactive));
}

#[tokio::test]
async fn text_tasks_are_grouped_by_topic() {
    let app = spawn_app().await;
    let (token, _) = app.student().await;
    let (_, topic, _, task) = seed_course(&app.pool, true).await;

    let topics: Vec<serde_json::Value> = app
        .client
        .get(app.url("/api/school/topic-text-tasks"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = topics.iter().find(|t| t["id"] == topic).unwrap();
    assert_eq!(entry["tasks"][0]["id"], task);

    let single: serde_json::Value = app
        .client
        .get(app.url(&format!("/api/school/topic-text-tasks/{}", task)))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(single["content"], "Explain ownership");

    let missing = app
        .client
        .get(app.url(&format!("/api/school/topic-text-tasks/{}", i64::MAX)))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn feedback_on_unknown_question_is_404() {
    let app = spawn_app().await;
    let (token, _) = app.student().await;

    let response = app
        .client
        .post(app.url("/api/school/question-feedback"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "question": i64::MAX, "text": "Typo" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}
