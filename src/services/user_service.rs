// src/services/user_service.rs
use crate::{
    config::AdminBootstrap,
    db,
    error::{AppError, AppResult},
    models::user::{NewUser, Role, User},
    services::auth_service,
};
use sqlx::SqlitePool;

/// Busca um utilizador na base de dados pelo seu ID.
pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: i64) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por ID: {}", user_id);
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, nome, email, senha_hash, role, created_at
        FROM users
        WHERE id = ?1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;

    if user.is_none() {
        tracing::debug!("Utilizador {} não encontrado.", user_id);
    }
    Ok(user)
}

/// Busca um utilizador pelo email (a coluna é COLLATE NOCASE).
pub async fn find_user_by_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por email: {}", email);
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, nome, email, senha_hash, role, created_at
        FROM users
        WHERE email = ?1
        "#,
    )
    .bind(email)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

/// Cria o utilizador com a senha já convertida em hash.
/// Email repetido é detetado pelo índice UNIQUE, sem verificação prévia.
pub async fn create_user(
    db_pool: &SqlitePool,
    new_user: &NewUser,
    bcrypt_cost: u32,
) -> AppResult<User> {
    tracing::info!("Tentando criar utilizador: {}", new_user.email);
    let senha_hash = auth_service::hash_password(&new_user.senha, bcrypt_cost).await?;

    let result = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (nome, email, senha_hash, role)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, nome, email, senha_hash, role, created_at
        "#,
    )
    .bind(&new_user.nome)
    .bind(&new_user.email)
    .bind(&senha_hash)
    .bind(new_user.role)
    .fetch_one(db_pool)
    .await;

    match result {
        Ok(user) => {
            tracing::info!("✅ Utilizador '{}' criado com id {}.", user.email, user.id);
            Ok(user)
        }
        Err(e) if db::is_unique_violation(&e) => {
            tracing::warn!("Falha ao criar user: email '{}' já existe.", new_user.email);
            Err(AppError::DuplicateEmail)
        }
        Err(e) => Err(e.into()),
    }
}

/// Garante que a conta de administrador configurada existe.
pub async fn ensure_admin(
    db_pool: &SqlitePool,
    admin: &AdminBootstrap,
    bcrypt_cost: u32,
) -> AppResult<()> {
    if let Some(existing) = find_user_by_email(db_pool, &admin.email).await? {
        if existing.role != Role::Admin {
            tracing::warn!(
                "⚠️ ADMIN_EMAIL '{}' pertence a um utilizador sem role admin; nada alterado.",
                admin.email
            );
        } else {
            tracing::debug!("Admin '{}' já existe.", admin.email);
        }
        return Ok(());
    }

    let new_admin = NewUser {
        nome: admin.nome.clone(),
        email: admin.email.clone(),
        senha: admin.senha.clone(),
        role: Role::Admin,
    };
    match create_user(db_pool, &new_admin, bcrypt_cost).await {
        Ok(user) => {
            tracing::info!("👑 Admin '{}' criado (id {}).", user.email, user.id);
            Ok(())
        }
        // Outra instância criou-o entretanto
        Err(AppError::DuplicateEmail) => Ok(()),
        Err(e) => Err(e),
    }
}
