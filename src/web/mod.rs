// src/web/mod.rs
pub mod action;
pub mod admin_handlers;
pub mod auth_handlers;
pub mod course_handlers;
pub mod health_handlers;
pub mod mw_admin;
pub mod mw_auth;
pub mod mw_cors;
pub mod routes;
pub mod user_course_handlers;
