// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, auth_handlers, course_handlers, health_handlers, mw_admin, mw_auth,
        mw_cors, user_course_handlers,
    },
};
use axum::{middleware, routing::get, Router};
use time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{
    cookie::{Key, SameSite},
    Expiry, SessionManagerLayer,
};
use tower_sessions_sqlx_store::SqliteStore;

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    // Cada handler decide se a ação pedida exige sessão
    let public_routes = Router::new()
        .route(
            "/auth",
            get(auth_handlers::handle_auth_get).post(auth_handlers::handle_auth_post),
        )
        .route("/course", get(course_handlers::handle_course_get))
        .route("/courses", get(course_handlers::handle_courses_get))
        .route(
            "/user-course",
            get(user_course_handlers::handle_user_course_get)
                .post(user_course_handlers::handle_user_course_post),
        )
        .route("/health", get(health_handlers::health));

    // --- Rotas de Admin ---
    // Exigem login E role admin
    let admin_routes = Router::new()
        .route(
            "/admin",
            get(admin_handlers::handle_admin_get).post(admin_handlers::handle_admin_post),
        )
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Router Final ---
    // resolve_session corre antes de require_admin; o CORS envolve tudo
    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::resolve_session,
        ))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_cors::cors,
        ))
        .with_state(app_state)
}

/// Router completo, com trace e sessões assinadas guardadas no SQLite.
pub fn create_app(app_state: AppState, session_store: SqliteStore, key: Key) -> Router {
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(app_state.config.cookie_secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_signed(key);

    create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer),
    )
}
