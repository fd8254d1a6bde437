// src/models/user.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Aluno,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Aluno => "aluno",
        }
    }

    /// Interpreta a role vinda do pedido (case-insensitive).
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "aluno" => Some(Role::Aluno),
            _ => None,
        }
    }
}

// Representa um utilizador lido da tabela 'users'
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub senha_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

/// Utilizador tal como é enviado ao cliente: nunca inclui a senha.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            nome: user.nome,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub senha: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub role: Option<String>,
}

/// Dados de registo já validados e normalizados.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub role: Role,
}
