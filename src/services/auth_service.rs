// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, PublicUser, RegisterPayload, Role, User},
    services::user_service,
};
use sqlx::SqlitePool;

pub const MIN_NOME_LEN: usize = 2;
pub const MIN_SENHA_LEN: usize = 6;

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt (custo {})...", cost);
        bcrypt::hash(&password, cost)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Validação básica de formato: `local@dominio.tld`, sem espaços.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Valida e normaliza os dados de registo (sem tocar na base de dados).
pub fn validate_registration(payload: RegisterPayload) -> AppResult<NewUser> {
    let nome = payload.nome.ok_or(AppError::MissingField("nome"))?;
    let email = payload.email.ok_or(AppError::MissingField("email"))?;
    let senha = payload.senha.ok_or(AppError::MissingField("senha"))?;

    let nome = nome.trim().to_string();
    let email = email.trim().to_string();

    if nome.chars().count() < MIN_NOME_LEN {
        return Err(AppError::Validation(format!(
            "O nome deve ter pelo menos {} caracteres",
            MIN_NOME_LEN
        )));
    }
    if !is_valid_email(&email) {
        return Err(AppError::Validation("E-mail inválido".to_string()));
    }
    if senha.chars().count() < MIN_SENHA_LEN {
        return Err(AppError::Validation(format!(
            "A senha deve ter no mínimo {} caracteres",
            MIN_SENHA_LEN
        )));
    }

    let role = match payload.role.as_deref().map(str::trim) {
        None | Some("") => Role::default(),
        Some(raw) => Role::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("Role inválida: {}", raw)))?,
    };

    Ok(NewUser {
        nome,
        email,
        senha,
        role,
    })
}

/// Regista um novo utilizador. Só um admin pode criar outro admin.
pub async fn register(
    db_pool: &SqlitePool,
    bcrypt_cost: u32,
    payload: RegisterPayload,
    caller_is_admin: bool,
) -> AppResult<PublicUser> {
    let new_user = validate_registration(payload)?;

    if new_user.role == Role::Admin && !caller_is_admin {
        tracing::warn!("Registo de admin recusado para {}: pedido sem sessão admin", new_user.email);
        return Err(AppError::Forbidden);
    }

    let user = user_service::create_user(db_pool, &new_user, bcrypt_cost).await?;
    Ok(PublicUser::from(user))
}

/// Confere email e senha. Devolve o utilizador completo para o handler abrir a sessão.
pub async fn login(db_pool: &SqlitePool, email: &str, senha: &str) -> AppResult<User> {
    let email = email.trim();
    tracing::info!("Tentativa de login para: {}", email);

    let user = user_service::find_user_by_email(db_pool, email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Utilizador não encontrado: {}", email);
            AppError::UserNotFound
        })?;

    if !verify_password(senha, &user.senha_hash).await? {
        tracing::warn!("Senha incorreta para: {}", email);
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!("✅ Login bem-sucedido para: {} (id {})", user.email, user.id);
    Ok(user)
}
