// src/web/mw_admin.rs
use crate::{error::AppError, web::mw_auth::CurrentUser};
use axum::{extract::Request, middleware::Next, response::Response};

/// Middleware que verifica se o utilizador logado tem a role "admin".
/// Deve ser executado *depois* do middleware `resolve_session`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let Some(current) = request.extensions().get::<CurrentUser>() else {
        tracing::debug!("Admin MW: pedido sem sessão.");
        return Err(AppError::Unauthorized);
    };

    if current.is_admin() {
        tracing::debug!("Admin MW: Acesso admin concedido para {}", current.id());
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Admin MW: Acesso negado para {} (sem role admin).", current.id());
        Err(AppError::Forbidden)
    }
}
