// src/handlers/school.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        course::{
            Course, CourseInstanceWithTopics, TextTask, Topic, TopicTextTask, TopicWithQuizzes,
            TopicWithTasks,
        },
        feedback::{CreateFeedbackRequest, QuestionFeedback},
        quiz::{PublicAnswer, PublicQuestion, Question, Quiz, QuizSummary},
    },
    repository::users::is_foreign_key_violation,
    utils::{html::clean_html, jwt::Claims},
};

/// Helper row: a course instance joined with its course.
#[derive(sqlx::FromRow)]
struct InstanceRow {
    id: i64,
    year: i32,
    semester: String,
    course_id: i64,
    course_title: String,
    course_description: String,
    course_is_active: bool,
}

/// Helper row: an answer option with its owning question.
#[derive(sqlx::FromRow)]
struct AnswerRow {
    id: i64,
    question_id: i64,
    text: String,
}

/// Lists the instances of active courses, each with its topics and quizzes.
pub async fn active_course_instances(
    State(pool): State<PgPool>,
) -> Result<impl IntoResponse, AppError> {
    let instances = sqlx::query_as::<_, InstanceRow>(
        r#"
        SELECT
            ci.id,
            ci.year,
            ci.semester,
            c.id AS course_id,
            c.title AS course_title,
            c.description AS course_description,
            c.is_active AS course_is_active
        FROM course_instances ci
        JOIN courses c ON c.id = ci.course_id
        WHERE c.is_active = TRUE
        ORDER BY ci.id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch course instances: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let course_ids: Vec<i64> = instances.iter().map(|i| i.course_id).collect();
    let topics = sqlx::query_as::<_, Topic>(
        "SELECT id, course_id, title, is_active FROM topics
         WHERE course_id = ANY($1) AND is_active = TRUE
         ORDER BY id",
    )
    .bind(&course_ids)
    .fetch_all(&pool)
    .await?;

    let topic_ids: Vec<i64> = topics.iter().map(|t| t.id).collect();
    let quizzes = sqlx::query_as::<_, Quiz>(
        "SELECT id, topic_id, title, is_active FROM quizzes
         WHERE topic_id = ANY($1)
         ORDER BY id",
    )
    .bind(&topic_ids)
    .fetch_all(&pool)
    .await?;

    let mut quizzes_by_topic: HashMap<i64, Vec<QuizSummary>> = HashMap::new();
    for quiz in quizzes {
        if let Some(topic_id) = quiz.topic_id {
            quizzes_by_topic.entry(topic_id).or_default().push(QuizSummary {
                id: quiz.id,
                title: quiz.title,
                is_active: quiz.is_active,
            });
        }
    }

    let mut topics_by_course: HashMap<i64, Vec<TopicWithQuizzes>> = HashMap::new();
    for topic in topics {
        topics_by_course
            .entry(topic.course_id)
            .or_default()
            .push(TopicWithQuizzes {
                id: topic.id,
                title: topic.title,
                quizzes: quizzes_by_topic.remove(&topic.id).unwrap_or_default(),
            });
    }

    // Instances of the same course share its topics.
    let response: Vec<CourseInstanceWithTopics> = instances
        .into_iter()
        .map(|row| {
            let topics = topics_by_course
                .get(&row.course_id)
                .cloned()
                .unwrap_or_default();

            CourseInstanceWithTopics {
                id: row.id,
                course: Course {
                    id: row.course_id,
                    title: row.course_title,
                    description: row.course_description,
                    is_active: row.course_is_active,
                },
                year: row.year,
                semester: row.semester,
                topics,
            }
        })
        .collect();

    Ok(Json(response))
}

/// Lists active quizzes ordered by id.
pub async fn active_quizzes(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, QuizSummary>(
        "SELECT id, title, is_active FROM quizzes WHERE is_active = TRUE ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(quizzes))
}

/// Returns a quiz's questions in random order, with their options.
/// The `is_correct` flag never leaves the server.
pub async fn questions_by_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, quiz_id, text FROM questions WHERE quiz_id = $1 ORDER BY RANDOM()",
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch questions of quiz {}: {:?}", quiz_id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let answers = sqlx::query_as::<_, AnswerRow>(
        "SELECT id, question_id, text FROM answers WHERE question_id = ANY($1) ORDER BY id",
    )
    .bind(&question_ids)
    .fetch_all(&pool)
    .await?;

    let mut answers_by_question: HashMap<i64, Vec<PublicAnswer>> = HashMap::new();
    for answer in answers {
        answers_by_question
            .entry(answer.question_id)
            .or_default()
            .push(PublicAnswer {
                id: answer.id,
                text: answer.text,
            });
    }

    let paper: Vec<PublicQuestion> = questions
        .into_iter()
        .map(|q| PublicQuestion {
            answers: answers_by_question.remove(&q.id).unwrap_or_default(),
            id: q.id,
            text: q.text,
        })
        .collect();

    Ok(Json(paper))
}

/// Lists every topic with its text tasks.
pub async fn topic_text_tasks(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let topics = sqlx::query_as::<_, Topic>(
        "SELECT id, course_id, title, is_active FROM topics ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    let tasks = sqlx::query_as::<_, TopicTextTask>(
        "SELECT id, topic_id, title, content FROM topic_text_tasks ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    let mut tasks_by_topic: HashMap<i64, Vec<TextTask>> = HashMap::new();
    for task in tasks {
        tasks_by_topic.entry(task.topic_id).or_default().push(TextTask {
            id: task.id,
            title: task.title,
            content: task.content,
        });
    }

    let response: Vec<TopicWithTasks> = topics
        .into_iter()
        .map(|t| TopicWithTasks {
            tasks: tasks_by_topic.remove(&t.id).unwrap_or_default(),
            id: t.id,
            title: t.title,
        })
        .collect();

    Ok(Json(response))
}

pub async fn text_task(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let task = sqlx::query_as::<_, TextTask>(
        "SELECT id, title, content FROM topic_text_tasks WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Text task not found".to_string()))?;

    Ok(Json(task))
}

/// Records a student's remark about a question.
pub async fn question_feedback(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let student_id = claims.user_id()?;

    let text = clean_html(&payload.text);
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("Feedback text is empty".to_string()));
    }

    let feedback = sqlx::query_as::<_, QuestionFeedback>(
        r#"
        INSERT INTO question_feedbacks (question_id, student_id, text)
        VALUES ($1, $2, $3)
        RETURNING id, question_id, student_id, text, created_at
        "#,
    )
    .bind(payload.question)
    .bind(student_id)
    .bind(&text)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound("Question not found".to_string())
        } else {
            tracing::error!("Failed to store question feedback: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": feedback.id,
            "message": "Question feedback recorded."
        })),
    ))
}
