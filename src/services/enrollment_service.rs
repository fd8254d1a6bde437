// src/services/enrollment_service.rs
use crate::{
    db,
    error::{AppError, AppResult},
    models::enrollment::{Enrollment, EnrollmentStatus, Progress, UserCourse},
};
use sqlx::SqlitePool;

const ENROLLMENT_NOT_FOUND: &str = "Inscrição não encontrada";
const USER_OR_COURSE_NOT_FOUND: &str = "Usuário ou curso não encontrado";

/// Inscreve o utilizador no curso. A unicidade do par vem do índice
/// `idx_user_courses_pair`, por isso dois pedidos simultâneos não duplicam a linha.
pub async fn enroll(db_pool: &SqlitePool, user_id: i64, course_id: i64) -> AppResult<Enrollment> {
    tracing::info!("Inscrevendo user {} no curso {}", user_id, course_id);
    let result = sqlx::query_as::<_, Enrollment>(
        r#"
        INSERT INTO user_courses (user_id, course_id)
        VALUES (?1, ?2)
        RETURNING id, user_id, course_id, watched_at, created_at
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(db_pool)
    .await;

    match result {
        Ok(enrollment) => {
            tracing::info!("✅ Inscrição {} criada.", enrollment.id);
            Ok(enrollment)
        }
        Err(e) if db::is_unique_violation(&e) => {
            tracing::warn!("User {} já inscrito no curso {}.", user_id, course_id);
            Err(AppError::AlreadyEnrolled)
        }
        Err(e) if db::is_foreign_key_violation(&e) => {
            Err(AppError::NotFound(USER_OR_COURSE_NOT_FOUND))
        }
        Err(e) => Err(e.into()),
    }
}

/// Inscrição de um par (user, curso), se existir.
pub async fn find_enrollment(
    db_pool: &SqlitePool,
    user_id: i64,
    course_id: i64,
) -> AppResult<Option<Enrollment>> {
    let enrollment = sqlx::query_as::<_, Enrollment>(
        r#"
        SELECT id, user_id, course_id, watched_at, created_at
        FROM user_courses
        WHERE user_id = ?1 AND course_id = ?2
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(enrollment)
}

pub async fn find_enrollment_by_id(
    db_pool: &SqlitePool,
    enrollment_id: i64,
) -> AppResult<Option<Enrollment>> {
    let enrollment = sqlx::query_as::<_, Enrollment>(
        r#"
        SELECT id, user_id, course_id, watched_at, created_at
        FROM user_courses
        WHERE id = ?1
        "#,
    )
    .bind(enrollment_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(enrollment)
}

pub async fn check_enrollment(
    db_pool: &SqlitePool,
    user_id: i64,
    course_id: i64,
) -> AppResult<EnrollmentStatus> {
    let enrollment = find_enrollment(db_pool, user_id, course_id)
        .await?
        .ok_or(AppError::NotEnrolled)?;
    Ok(EnrollmentStatus {
        enrolled: true,
        watched_at: enrollment.watched_at,
    })
}

pub async fn get_progress(
    db_pool: &SqlitePool,
    user_id: i64,
    course_id: i64,
) -> AppResult<Progress> {
    let enrollment = find_enrollment(db_pool, user_id, course_id)
        .await?
        .ok_or(AppError::NotEnrolled)?;
    Ok(Progress::from_watched_at(enrollment.watched_at))
}

/// Marca como assistido. Repetir não altera a data já gravada.
pub async fn mark_watched(db_pool: &SqlitePool, enrollment_id: i64) -> AppResult<()> {
    tracing::info!("Marcando inscrição {} como assistida", enrollment_id);
    let rows_affected = sqlx::query(
        r#"
        UPDATE user_courses
        SET watched_at = COALESCE(watched_at, CURRENT_TIMESTAMP)
        WHERE id = ?1
        "#,
    )
    .bind(enrollment_id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::NotFound(ENROLLMENT_NOT_FOUND));
    }
    Ok(())
}

pub async fn remove_enrollment(db_pool: &SqlitePool, enrollment_id: i64) -> AppResult<()> {
    tracing::info!("Removendo inscrição {}", enrollment_id);
    let rows_affected = sqlx::query("DELETE FROM user_courses WHERE id = ?1")
        .bind(enrollment_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::NotFound(ENROLLMENT_NOT_FOUND));
    }
    Ok(())
}

/// Cursos em que o utilizador está inscrito, concluídos mais recentes primeiro.
pub async fn user_courses(db_pool: &SqlitePool, user_id: i64) -> AppResult<Vec<UserCourse>> {
    tracing::debug!("Buscando cursos do user {}", user_id);
    let courses = sqlx::query_as::<_, UserCourse>(
        r#"
        SELECT c.id, c.creator_id, c.name, c.description, c.url_image,
               c.created_at, c.modified_at,
               uc.id AS user_course_id,
               uc.watched_at AS watched_at,
               CASE WHEN uc.watched_at IS NOT NULL THEN 100 ELSE 0 END AS progress
        FROM user_courses uc
        JOIN courses c ON c.id = uc.course_id
        WHERE uc.user_id = ?1
        ORDER BY uc.watched_at IS NULL, uc.watched_at DESC, c.created_at DESC, c.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;
    Ok(courses)
}
