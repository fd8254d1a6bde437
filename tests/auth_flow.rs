mod common;

use axum::http::StatusCode;
use common::{TestApp, ADMIN_EMAIL, ADMIN_SENHA};
use serde_json::json;

#[tokio::test]
async fn register_login_validate_logout() {
    let app = TestApp::new().await;

    let resp = app
        .post_json(
            "/auth?action=register",
            json!({ "nome": "Ana Souza", "email": "ana@cursos.test", "senha": "segredo1" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["message"], "Usuário criado com sucesso");
    assert_eq!(resp.body["user"]["email"], "ana@cursos.test");
    assert_eq!(resp.body["user"]["role"], "aluno");
    // O hash nunca sai na resposta
    assert!(resp.body["user"].get("senha_hash").is_none());

    // Sem login a sessão não é válida
    let resp = app.get("/auth?action=validateSession", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["valid"], false);

    let cookie = app.login("ana@cursos.test", "segredo1").await;

    let resp = app.get("/auth?action=validateSession", Some(&cookie)).await;
    assert_eq!(resp.body["valid"], true);
    assert_eq!(resp.body["user"]["nome"], "Ana Souza");

    // Nome antigo da ação
    let resp = app.get("/auth?action=validate", Some(&cookie)).await;
    assert_eq!(resp.body["valid"], true);

    let resp = app
        .post_json("/auth?action=logout", json!({}), Some(&cookie))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Logout realizado com sucesso");

    let resp = app.get("/auth?action=validateSession", Some(&cookie)).await;
    assert_eq!(resp.body["valid"], false);
}

#[tokio::test]
async fn action_can_come_from_body() {
    let app = TestApp::new().await;
    app.register("Bruno", "bruno@cursos.test", "segredo1").await;

    let resp = app
        .post_json(
            "/auth",
            json!({ "action": "login", "email": "bruno@cursos.test", "senha": "segredo1" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Login realizado com sucesso");
    assert!(resp.cookie.is_some());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::new().await;
    app.register("Carla", "carla@cursos.test", "segredo1").await;

    // Email compara sem distinguir maiúsculas
    let resp = app
        .post_json(
            "/auth?action=register",
            json!({ "nome": "Outra Carla", "email": "CARLA@cursos.test", "senha": "segredo2" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["kind"], "duplicate_email");
    assert_eq!(resp.body["error"], "Este e-mail já está cadastrado");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1")
        .bind("carla@cursos.test")
        .fetch_one(&app.pool)
        .await
        .expect("contagem");
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn registration_is_validated() {
    let app = TestApp::new().await;

    let resp = app
        .post_json(
            "/auth?action=register",
            json!({ "nome": "Davi", "email": "davi@cursos.test" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["kind"], "missing_field");

    let resp = app
        .post_json(
            "/auth?action=register",
            json!({ "nome": "Davi", "email": "sem-arroba", "senha": "segredo1" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["kind"], "validation");

    let resp = app
        .post_json(
            "/auth?action=register",
            json!({ "nome": "Davi", "email": "davi@cursos.test", "senha": "123" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["kind"], "validation");
}

#[tokio::test]
async fn only_admin_registers_admin() {
    let app = TestApp::new().await;
    let admin_payload = json!({
        "nome": "Eva",
        "email": "eva@cursos.test",
        "senha": "segredo1",
        "role": "admin",
    });

    let resp = app
        .post_json("/auth?action=register", admin_payload.clone(), None)
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let (_, admin_cookie) = app.login_admin().await;
    let resp = app
        .post_json(
            "/auth?action=register",
            admin_payload,
            Some(&admin_cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["user"]["role"], "admin");
}

#[tokio::test]
async fn login_failures() {
    let app = TestApp::new().await;

    let resp = app
        .post_json(
            "/auth?action=login",
            json!({ "email": "ninguem@cursos.test", "senha": "segredo1" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "Usuário não encontrado");

    let resp = app
        .post_json(
            "/auth?action=login",
            json!({ "email": ADMIN_EMAIL, "senha": "errada" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["kind"], "invalid_credentials");
    assert!(resp.cookie.is_none());

    let resp = app
        .post_json("/auth?action=login", json!({ "email": ADMIN_EMAIL }), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    // Senha certa continua a funcionar
    app.login(ADMIN_EMAIL, ADMIN_SENHA).await;
}

#[tokio::test]
async fn missing_unknown_action_and_bad_json() {
    let app = TestApp::new().await;

    let resp = app.post_json("/auth", json!({}), None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["kind"], "missing_action");

    let resp = app.get("/auth?action=voar", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["kind"], "unknown_action");

    let resp = app
        .request(
            axum::http::Method::POST,
            "/auth?action=login",
            None,
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["kind"], "bad_request");
}
