// src/web/mw_auth.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{PublicUser, Role},
    services::user_service,
    state::AppState,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use tower_sessions::Session;

/// Chave da sessão onde fica o id do utilizador autenticado.
pub const USER_ID_KEY: &str = "user_id";

/// Utilizador da sessão atual, validado contra a base de dados em cada pedido.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub PublicUser);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }

    /// Um aluno só age sobre os próprios dados; um admin age sobre todos.
    pub fn ensure_can_act_for(&self, user_id: i64) -> AppResult<()> {
        if self.id() == user_id || self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(
                "User {} tentou agir em nome do user {}",
                self.id(),
                user_id
            );
            Err(AppError::Forbidden)
        }
    }
}

/// Exige sessão válida; sem ela o pedido falha com 401.
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Sessão opcional: rotas públicas que mudam de comportamento com login.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    /// Exige sessão e que ela pertença a `user_id` (ou a um admin).
    pub fn authorize_for(&self, user_id: i64) -> AppResult<&CurrentUser> {
        let current = self.0.as_ref().ok_or(AppError::Unauthorized)?;
        current.ensure_can_act_for(user_id)?;
        Ok(current)
    }

    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(CurrentUser::is_admin)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Middleware que lê a sessão e, se houver login, põe o `CurrentUser` nas
/// extensões do pedido. Não bloqueia nada: quem exige login são os handlers
/// (via `CurrentUser`/`MaybeUser`) e o `require_admin`.
pub async fn resolve_session(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match session.get::<i64>(USER_ID_KEY).await {
        Ok(Some(user_id)) => {
            match user_service::find_user_by_id(&state.db_pool, user_id).await? {
                Some(user) => {
                    tracing::debug!("Autenticação MW: user {} autenticado.", user_id);
                    request
                        .extensions_mut()
                        .insert(CurrentUser(PublicUser::from(user)));
                }
                None => {
                    // A sessão aponta para um utilizador que já não existe
                    tracing::warn!("Autenticação MW: user {} da sessão não existe. Limpando sessão.", user_id);
                    session.flush().await.map_err(|e| {
                        AppError::SessionError(format!("Falha ao limpar sessão: {}", e))
                    })?;
                }
            }
        }
        Ok(None) => {
            tracing::trace!("Autenticação MW: pedido anónimo.");
        }
        Err(e) => {
            tracing::error!("Autenticação MW: Erro ao ler sessão: {:?}", e);
            return Err(AppError::SessionError(format!("Erro ao verificar sessão: {}", e)));
        }
    }

    Ok(next.run(request).await)
}
