// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        course::{Course, CreateCoursePayload, UpdateCoursePayload},
        deserialize_optional_id,
    },
    services::course_service,
    state::AppState,
    web::action::{parse_body, post_action, Action, AdminGetAction, AdminPostAction, MessageResponse},
};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    action: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CourseCreatedResponse {
    message: &'static str,
    course: Course,
}

/// GET /admin - listarCurso, deletarCurso
pub async fn handle_admin_get(
    State(state): State<AppState>,
    query: Result<Query<AdminQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let action = AdminGetAction::parse(query.action.as_deref())?;
    tracing::debug!("GET /admin: ação {}", action.name());

    match action {
        AdminGetAction::ListarCurso => {
            let courses = course_service::list_all_courses(&state.db_pool).await?;
            Ok(Json(courses).into_response())
        }
        AdminGetAction::DeletarCurso => {
            let id = query.id.ok_or(AppError::MissingField("id"))?;
            course_service::delete_course(&state.db_pool, id).await?;
            Ok(Json(MessageResponse::new("Curso deletado")).into_response())
        }
    }
}

/// POST /admin - criarCurso, modificarCurso
pub async fn handle_admin_post(
    State(state): State<AppState>,
    query: Result<Query<AdminQuery>, QueryRejection>,
    body: Bytes,
) -> AppResult<Response> {
    let Query(query) = query?;
    let action = post_action::<AdminPostAction>(query.action.as_deref(), &body)?;
    tracing::info!("POST /admin: ação {}", action.name());

    match action {
        AdminPostAction::CriarCurso => {
            let payload: CreateCoursePayload = parse_body(&body)?;
            let fields = course_service::validate_course_fields(
                payload.creator_id,
                payload.name,
                payload.description,
                payload.url_image,
            )?;
            let course = course_service::create_course(&state.db_pool, &fields).await?;
            Ok((
                StatusCode::CREATED,
                Json(CourseCreatedResponse {
                    message: "Curso criado com sucesso",
                    course,
                }),
            )
                .into_response())
        }
        AdminPostAction::ModificarCurso => {
            let payload: UpdateCoursePayload = parse_body(&body)?;
            let id = payload.id.ok_or(AppError::MissingField("id"))?;
            // Edição reescreve todos os campos: os obrigatórios têm de vir de novo
            let fields = course_service::validate_course_fields(
                payload.fields.creator_id,
                payload.fields.name,
                payload.fields.description,
                payload.fields.url_image,
            )?;
            course_service::update_course(&state.db_pool, id, &fields).await?;
            Ok(Json(MessageResponse::new("Curso modificado")).into_response())
        }
    }
}
