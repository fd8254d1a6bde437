// src/models/enrollment.rs
use super::{course::Course, deserialize_optional_id};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Número fixo de aulas por curso (não há aulas persistidas).
pub const TOTAL_LESSONS: i64 = 10;

/// Linha da tabela `user_courses`.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub watched_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Enrollment {
    pub fn is_completed(&self) -> bool {
        self.watched_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrollmentStatus {
    pub enrolled: bool,
    pub watched_at: Option<NaiveDateTime>,
}

/// Progresso binário: 0% enquanto não assistido, 100% depois.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Progress {
    pub progress: i64,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    pub watched_at: Option<NaiveDateTime>,
}

impl Progress {
    pub fn from_watched_at(watched_at: Option<NaiveDateTime>) -> Progress {
        let completed = watched_at.is_some();
        Progress {
            progress: if completed { 100 } else { 0 },
            total_lessons: TOTAL_LESSONS,
            completed_lessons: if completed { TOTAL_LESSONS } else { 0 },
            watched_at,
        }
    }
}

/// Curso de um utilizador, com o id da inscrição e o progresso.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserCourse {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub user_course_id: i64,
    pub watched_at: Option<NaiveDateTime>,
    pub progress: i64,
}

#[derive(Debug, Deserialize)]
pub struct EnrollPayload {
    #[serde(rename = "userId", default, deserialize_with = "deserialize_optional_id")]
    pub user_id: Option<i64>,
    #[serde(rename = "courseId", default, deserialize_with = "deserialize_optional_id")]
    pub course_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UserCoursePayload {
    #[serde(rename = "userCourseId", default, deserialize_with = "deserialize_optional_id")]
    pub user_course_id: Option<i64>,
}
