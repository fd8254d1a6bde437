// src/web/course_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        course::{lenient_int, CourseDetail, CoursePage, CourseQuery},
        deserialize_optional_id,
    },
    services::{course_service, enrollment_service},
    state::AppState,
    web::{
        action::{Action, CourseGetAction, CoursesGetAction, ListResponse},
        mw_auth::MaybeUser,
    },
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CourseParams {
    action: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    id: Option<i64>,
    #[serde(rename = "userId", default, deserialize_with = "deserialize_optional_id")]
    user_id: Option<i64>,
    #[serde(rename = "courseId", default, deserialize_with = "deserialize_optional_id")]
    course_id: Option<i64>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoursesParams {
    action: Option<String>,
    page: Option<String>,
    limit: Option<String>,
    search: Option<String>,
    sort: Option<String>,
    #[serde(rename = "userId", default, deserialize_with = "deserialize_optional_id")]
    user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CourseResponse {
    message: &'static str,
    course: CourseDetail,
}

#[derive(Debug, Serialize)]
struct CoursePageResponse {
    message: &'static str,
    #[serde(flatten)]
    page: CoursePage,
}

/// GET /course - getCourse, checkEnrollment, getCourseProgress, getLatestCourses
pub async fn handle_course_get(
    State(state): State<AppState>,
    caller: MaybeUser,
    query: Result<Query<CourseParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = query?;
    let action = CourseGetAction::parse(params.action.as_deref())?;
    tracing::debug!("GET /course: ação {}", action.name());

    match action {
        CourseGetAction::GetCourse => {
            let id = params.id.ok_or(AppError::MissingField("id"))?;
            let course = course_service::get_course(&state.db_pool, id).await?;
            Ok(Json(CourseResponse {
                message: "Curso carregado com sucesso",
                course,
            })
            .into_response())
        }
        CourseGetAction::CheckEnrollment => {
            check_enrollment(&state, &caller, params.user_id, params.course_id).await
        }
        CourseGetAction::GetCourseProgress => {
            course_progress(&state, &caller, params.user_id, params.course_id).await
        }
        CourseGetAction::GetLatestCourses => {
            let limit = params.limit.as_deref().map(lenient_int);
            let courses = course_service::latest_courses(&state.db_pool, limit).await?;
            Ok(Json(ListResponse::new("Últimos cursos carregados", courses)).into_response())
        }
    }
}

/// GET /courses - getCourses (listagem pública, paginada)
pub async fn handle_courses_get(
    State(state): State<AppState>,
    caller: MaybeUser,
    query: Result<Query<CoursesParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = query?;
    match CoursesGetAction::parse(params.action.as_deref())? {
        CoursesGetAction::GetCourses => {
            // O estado de inscrição só é anexado para o próprio utilizador
            if let Some(user_id) = params.user_id {
                caller.authorize_for(user_id)?;
            }

            let course_query = CourseQuery::new(
                params.search.as_deref(),
                params.sort.as_deref(),
                params.page.as_deref(),
                params.limit.as_deref(),
            );
            let page =
                course_service::list_courses(&state.db_pool, &course_query, params.user_id).await?;
            Ok(Json(CoursePageResponse {
                message: "Cursos carregados com sucesso",
                page,
            })
            .into_response())
        }
    }
}

fn required_pair(user_id: Option<i64>, course_id: Option<i64>) -> AppResult<(i64, i64)> {
    let user_id = user_id.ok_or(AppError::MissingField("userId"))?;
    let course_id = course_id.ok_or(AppError::MissingField("courseId"))?;
    Ok((user_id, course_id))
}

/// checkEnrollment (também exposto em /user-course)
pub(crate) async fn check_enrollment(
    state: &AppState,
    caller: &MaybeUser,
    user_id: Option<i64>,
    course_id: Option<i64>,
) -> AppResult<Response> {
    let (user_id, course_id) = required_pair(user_id, course_id)?;
    caller.authorize_for(user_id)?;
    let status = enrollment_service::check_enrollment(&state.db_pool, user_id, course_id).await?;
    Ok(Json(status).into_response())
}

/// getCourseProgress (também exposto em /user-course)
pub(crate) async fn course_progress(
    state: &AppState,
    caller: &MaybeUser,
    user_id: Option<i64>,
    course_id: Option<i64>,
) -> AppResult<Response> {
    let (user_id, course_id) = required_pair(user_id, course_id)?;
    caller.authorize_for(user_id)?;
    let progress = enrollment_service::get_progress(&state.db_pool, user_id, course_id).await?;
    Ok(Json(progress).into_response())
}
