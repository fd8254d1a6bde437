// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr};

/// Tamanho mínimo exigido pela chave de assinatura dos cookies.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
    pub admin: Option<AdminBootstrap>,
}

/// Conta de administrador criada no arranque, se configurada.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub nome: String,
    pub email: String,
    pub senha: String,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let session_secret = env::var("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(AppError::ConfigError(format!(
                "SESSION_SECRET precisa de pelo menos {} bytes",
                MIN_SESSION_SECRET_LEN
            )));
        }

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::ConfigError(format!("BIND_ADDR inválido: {}", e)))?;

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:8000".to_string());

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or_else(|| AppError::ConfigError(format!("BCRYPT_COST inválido: {}", raw)))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        // Só cria o admin se email e senha estiverem ambos definidos
        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(senha)) => Some(AdminBootstrap {
                nome: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrador".to_string()),
                email,
                senha,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            session_secret,
            bind_addr,
            cors_origin,
            cookie_secure,
            bcrypt_cost,
            admin,
        })
    }
}
