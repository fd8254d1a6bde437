// src/web/user_course_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        deserialize_optional_id,
        enrollment::{EnrollPayload, UserCoursePayload},
    },
    services::{course_service, enrollment_service},
    state::AppState,
    web::{
        action::{
            parse_body, post_action, Action, ListResponse, MessageResponse, UserCourseGetAction,
            UserCoursePostAction,
        },
        course_handlers,
        mw_auth::{CurrentUser, MaybeUser},
    },
};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UserCourseParams {
    action: Option<String>,
    #[serde(rename = "userId", default, deserialize_with = "deserialize_optional_id")]
    user_id: Option<i64>,
    #[serde(rename = "courseId", default, deserialize_with = "deserialize_optional_id")]
    course_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct EnrolledResponse {
    message: &'static str,
    #[serde(rename = "enrollmentId")]
    enrollment_id: i64,
}

/// GET /user-course - getUserCourses, getFeaturedCourses (+ checkEnrollment, getCourseProgress)
pub async fn handle_user_course_get(
    State(state): State<AppState>,
    caller: MaybeUser,
    query: Result<Query<UserCourseParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = query?;
    let action = UserCourseGetAction::parse(params.action.as_deref())?;
    tracing::debug!("GET /user-course: ação {}", action.name());

    match action {
        UserCourseGetAction::GetUserCourses => {
            let user_id = params.user_id.ok_or(AppError::MissingField("userId"))?;
            caller.authorize_for(user_id)?;
            let courses = enrollment_service::user_courses(&state.db_pool, user_id).await?;
            Ok(Json(ListResponse::new("Cursos carregados com sucesso", courses)).into_response())
        }
        UserCourseGetAction::GetFeaturedCourses => {
            let courses = course_service::featured_courses(&state.db_pool).await?;
            Ok(Json(ListResponse::new("Cursos em destaque carregados", courses)).into_response())
        }
        UserCourseGetAction::CheckEnrollment => {
            course_handlers::check_enrollment(&state, &caller, params.user_id, params.course_id)
                .await
        }
        UserCourseGetAction::GetCourseProgress => {
            course_handlers::course_progress(&state, &caller, params.user_id, params.course_id)
                .await
        }
    }
}

/// POST /user-course - enrollCourse, markAsWatched, removeEnrollment (exigem sessão)
pub async fn handle_user_course_post(
    State(state): State<AppState>,
    current: CurrentUser,
    query: Result<Query<UserCourseParams>, QueryRejection>,
    body: Bytes,
) -> AppResult<Response> {
    let Query(params) = query?;
    let action = post_action::<UserCoursePostAction>(params.action.as_deref(), &body)?;
    tracing::info!("POST /user-course: ação {} (user {})", action.name(), current.id());

    match action {
        UserCoursePostAction::EnrollCourse => {
            let payload: EnrollPayload = parse_body(&body)?;
            let user_id = payload.user_id.ok_or(AppError::MissingField("userId"))?;
            let course_id = payload.course_id.ok_or(AppError::MissingField("courseId"))?;
            current.ensure_can_act_for(user_id)?;

            let enrollment = enrollment_service::enroll(&state.db_pool, user_id, course_id).await?;
            Ok((
                StatusCode::CREATED,
                Json(EnrolledResponse {
                    message: "Inscrição realizada com sucesso",
                    enrollment_id: enrollment.id,
                }),
            )
                .into_response())
        }
        UserCoursePostAction::MarkAsWatched => {
            let enrollment_id = owned_enrollment_id(&state, &current, &body).await?;
            enrollment_service::mark_watched(&state.db_pool, enrollment_id).await?;
            Ok(Json(MessageResponse::new("Curso marcado como assistido")).into_response())
        }
        UserCoursePostAction::RemoveEnrollment => {
            let enrollment_id = owned_enrollment_id(&state, &current, &body).await?;
            enrollment_service::remove_enrollment(&state.db_pool, enrollment_id).await?;
            Ok(Json(MessageResponse::new("Inscrição removida com sucesso")).into_response())
        }
    }
}

/// Lê `userCourseId` do corpo e confirma que a inscrição é do utilizador da sessão.
async fn owned_enrollment_id(
    state: &AppState,
    current: &CurrentUser,
    body: &Bytes,
) -> AppResult<i64> {
    let payload: UserCoursePayload = parse_body(body)?;
    let enrollment_id = payload
        .user_course_id
        .ok_or(AppError::MissingField("userCourseId"))?;

    let enrollment = enrollment_service::find_enrollment_by_id(&state.db_pool, enrollment_id)
        .await?
        .ok_or(AppError::NotFound("Inscrição não encontrada"))?;
    current.ensure_can_act_for(enrollment.user_id)?;
    Ok(enrollment.id)
}
