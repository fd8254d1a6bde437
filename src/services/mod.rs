// src/services/mod.rs
pub mod auth_service;
pub mod course_service;
pub mod enrollment_service;
pub mod user_service;
