// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::quiz::QuizSummary;

/// Represents the 'courses' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub is_active: bool,
}

/// Text-based study task attached to a topic.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TopicTextTask {
    pub id: i64,
    pub topic_id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicWithQuizzes {
    pub id: i64,
    pub title: String,
    pub quizzes: Vec<QuizSummary>,
}

/// A concrete run of a course in a given semester, with its topics.
#[derive(Debug, Serialize)]
pub struct CourseInstanceWithTopics {
    pub id: i64,
    pub course: Course,
    pub year: i32,
    pub semester: String,
    pub topics: Vec<TopicWithQuizzes>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TextTask {
    pub id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct TopicWithTasks {
    pub id: i64,
    pub title: String,
    pub tasks: Vec<TextTask>,
}
