// tests/common/mod.rs
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use cursos::{
    config::{AdminBootstrap, Config},
    db,
    services::user_service,
    state::AppState,
    web::routes,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::cookie::Key;
use tower_sessions_sqlx_store::SqliteStore;

pub const ADMIN_EMAIL: &str = "admin@cursos.test";
pub const ADMIN_SENHA: &str = "admin123";

/// Aplicação completa sobre uma base SQLite temporária.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub headers: axum::http::HeaderMap,
    /// Par `id=...` do Set-Cookie, pronto para reenviar.
    pub cookie: Option<String>,
}

pub fn test_config(database_url: String) -> Config {
    Config {
        database_url,
        session_secret: "s".repeat(64),
        bind_addr: "127.0.0.1:0".parse().expect("endereço de teste"),
        cors_origin: "http://localhost:8000".to_string(),
        cookie_secure: false,
        // Custo mínimo do bcrypt para os testes correrem depressa
        bcrypt_cost: 4,
        admin: Some(AdminBootstrap {
            nome: "Admin".to_string(),
            email: ADMIN_EMAIL.to_string(),
            senha: ADMIN_SENHA.to_string(),
        }),
    }
}

impl TestApp {
    pub async fn new() -> TestApp {
        let dir = tempfile::tempdir().expect("tempdir");
        let database_url = format!("sqlite://{}", dir.path().join("cursos.db").display());
        let config = test_config(database_url);

        let pool = db::create_db_pool(&config.database_url)
            .await
            .expect("Falha ao criar a base de teste");
        if let Some(admin) = &config.admin {
            user_service::ensure_admin(&pool, admin, config.bcrypt_cost)
                .await
                .expect("Falha ao criar admin");
        }

        let store = SqliteStore::new(pool.clone())
            .with_table_name("sessions")
            .expect("nome de tabela válido");
        store.migrate().await.expect("Falha ao migrar sessões");

        let state = AppState::new(pool.clone(), config).expect("estado válido");
        let router = routes::create_app(state, store, Key::from(&[7u8; 64]));

        TestApp {
            router,
            pool,
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("pedido válido");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router não falha");

        let status = response.status();
        let headers = response.headers().clone();
        let cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("corpo legível");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            headers,
            cookie,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, None, cookie).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> TestResponse {
        self.request(Method::POST, uri, Some(body), cookie).await
    }

    /// Regista um aluno e devolve o id.
    pub async fn register(&self, nome: &str, email: &str, senha: &str) -> i64 {
        let resp = self
            .post_json(
                "/auth?action=register",
                serde_json::json!({ "nome": nome, "email": email, "senha": senha }),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "registo falhou: {}", resp.body);
        resp.body["user"]["id"].as_i64().expect("id do utilizador")
    }

    /// Faz login e devolve o cookie de sessão.
    pub async fn login(&self, email: &str, senha: &str) -> String {
        let resp = self
            .post_json(
                "/auth?action=login",
                serde_json::json!({ "email": email, "senha": senha }),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login falhou: {}", resp.body);
        resp.cookie.expect("login devolve cookie de sessão")
    }

    pub async fn login_admin(&self) -> (i64, String) {
        let cookie = self.login(ADMIN_EMAIL, ADMIN_SENHA).await;
        let resp = self.get("/auth?action=validateSession", Some(&cookie)).await;
        let id = resp.body["user"]["id"].as_i64().expect("id do admin");
        (id, cookie)
    }

    /// Cria um curso pela API de administração e devolve o id.
    pub async fn create_course(&self, admin_cookie: &str, creator_id: i64, name: &str) -> i64 {
        let resp = self
            .post_json(
                "/admin?action=criarCurso",
                serde_json::json!({
                    "idCreator": creator_id,
                    "name": name,
                    "description": format!("Descrição de {}", name),
                    "urlImage": "https://img.test/curso.png",
                }),
                Some(admin_cookie),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "criarCurso falhou: {}", resp.body);
        resp.body["course"]["id"].as_i64().expect("id do curso")
    }
}
