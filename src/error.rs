// src/error.rs
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // --- Erros internos (nunca expostos ao cliente em detalhe) ---
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Configuração inválida: {0}")]
    ConfigError(String),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Erro na sessão: {0}")]
    SessionError(String),

    #[error("Erro interno inesperado")]
    InternalServerError,

    // --- Erros do cliente ---
    #[error("Campo obrigatório não enviado: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Ação não especificada")]
    MissingAction,

    #[error("Ação desconhecida: {0}")]
    UnknownAction(String),

    #[error("Pedido inválido: {0}")]
    BadRequest(String),

    /// Recurso inexistente; a mensagem já vem completa ("Curso não encontrado").
    #[error("{0}")]
    NotFound(&'static str),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Usuário não inscrito")]
    NotEnrolled,

    #[error("Este e-mail já está cadastrado")]
    DuplicateEmail,

    #[error("Usuário já inscrito neste curso")]
    AlreadyEnrolled,

    #[error("Senha incorreta")]
    InvalidCredentials,

    #[error("Sessão inválida ou inexistente")]
    Unauthorized,

    #[error("Acesso negado")]
    Forbidden,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingField(_)
            | AppError::Validation(_)
            | AppError::MissingAction
            | AppError::UnknownAction(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::UserNotFound | AppError::NotEnrolled => {
                StatusCode::NOT_FOUND
            }
            AppError::DuplicateEmail | AppError::AlreadyEnrolled => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Identificador estável do tipo de erro, enviado junto com a mensagem.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MissingField(_) => "missing_field",
            AppError::Validation(_) => "validation",
            AppError::MissingAction => "missing_action",
            AppError::UnknownAction(_) => "unknown_action",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::UserNotFound => "user_not_found",
            AppError::NotEnrolled => "not_enrolled",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::AlreadyEnrolled => "already_enrolled",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden => "forbidden",
            _ => "server_error",
        }
    }

    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            // Detalhes internos ficam apenas no log
            "Erro no servidor".to_string()
        } else {
            self.to_string()
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

// Como converter AppError numa resposta HTTP
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro processado: {:?}", self);
        } else {
            tracing::warn!("Pedido rejeitado ({}): {}", status.as_u16(), self);
        }

        let body = ErrorBody {
            error: self.public_message(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
