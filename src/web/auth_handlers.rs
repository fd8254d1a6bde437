// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginPayload, PublicUser, RegisterPayload},
    services::auth_service,
    state::AppState,
    web::{
        action::{parse_body, post_action, Action, AuthGetAction, AuthPostAction, MessageResponse},
        mw_auth::{MaybeUser, USER_ID_KEY},
    },
};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    action: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    message: &'static str,
    user: PublicUser,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<PublicUser>,
}

/// POST /auth - login, register, logout
pub async fn handle_auth_post(
    State(state): State<AppState>,
    session: Session,
    caller: MaybeUser,
    query: Result<Query<AuthQuery>, QueryRejection>,
    body: Bytes,
) -> AppResult<Response> {
    let Query(query) = query?;
    let action = post_action::<AuthPostAction>(query.action.as_deref(), &body)?;
    tracing::debug!("POST /auth: ação {}", action.name());

    match action {
        AuthPostAction::Login => handle_login(&state, &session, parse_body(&body)?).await,
        AuthPostAction::Register => {
            handle_register(&state, &caller, parse_body(&body)?).await
        }
        AuthPostAction::Logout => handle_logout(&session).await,
    }
}

/// GET /auth - validateSession
pub async fn handle_auth_get(
    caller: MaybeUser,
    query: Result<Query<AuthQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    match AuthGetAction::parse(query.action.as_deref())? {
        AuthGetAction::ValidateSession => {
            let user = caller.0.map(|current| current.0);
            tracing::debug!("Validação de sessão: válida = {}", user.is_some());
            Ok(Json(SessionResponse {
                valid: user.is_some(),
                user,
            })
            .into_response())
        }
    }
}

async fn handle_login(
    state: &AppState,
    session: &Session,
    payload: LoginPayload,
) -> AppResult<Response> {
    let email = payload.email.ok_or(AppError::MissingField("email"))?;
    let senha = payload.senha.ok_or(AppError::MissingField("senha"))?;

    let user = auth_service::login(&state.db_pool, &email, &senha).await?;

    // Gera novo ID de sessão (evita fixação) e guarda o utilizador
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao rodar ID: {}", e)))?;
    session
        .insert(USER_ID_KEY, user.id)
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao inserir na sessão: {}", e)))?;

    Ok(Json(UserResponse {
        message: "Login realizado com sucesso",
        user: PublicUser::from(user),
    })
    .into_response())
}

async fn handle_register(
    state: &AppState,
    caller: &MaybeUser,
    payload: RegisterPayload,
) -> AppResult<Response> {
    let user = auth_service::register(
        &state.db_pool,
        state.bcrypt_cost(),
        payload,
        caller.is_admin(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "Usuário criado com sucesso",
            user,
        }),
    )
        .into_response())
}

async fn handle_logout(session: &Session) -> AppResult<Response> {
    let user_id: Option<i64> = match session.get(USER_ID_KEY).await {
        Ok(id) => id,
        Err(e) => {
            // A sessão é apagada na mesma; só se perde o id no log
            tracing::warn!("Logout: erro ao ler sessão: {:?}", e);
            None
        }
    };

    // Apaga todos os dados da sessão atual
    session
        .flush()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {}", e)))?;

    match user_id {
        Some(id) => tracing::info!("🚪 Utilizador {} desligado.", id),
        None => tracing::info!("🚪 Sessão anónima desligada."),
    }

    Ok(Json(MessageResponse::new("Logout realizado com sucesso")).into_response())
}
