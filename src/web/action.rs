// src/web/action.rs
//! Tabela de ações: cada par (método, caminho) aceita um conjunto fechado de
//! ações, identificadas pelo parâmetro `action`.
use crate::error::{AppError, AppResult};
use axum::body::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub trait Action: Sized + Copy + PartialEq + 'static {
    /// Nome da ação no pedido e variante correspondente.
    const TABLE: &'static [(&'static str, Self)];

    fn parse(raw: Option<&str>) -> AppResult<Self> {
        let raw = raw
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(AppError::MissingAction)?;
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, action)| *action)
            .ok_or_else(|| AppError::UnknownAction(raw.to_string()))
    }

    fn name(&self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, action)| action == self)
            .map(|(name, _)| *name)
            .unwrap_or("desconhecida")
    }
}

// --- /admin ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminGetAction {
    ListarCurso,
    DeletarCurso,
}

impl Action for AdminGetAction {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("listarCurso", Self::ListarCurso),
        ("deletarCurso", Self::DeletarCurso),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPostAction {
    CriarCurso,
    ModificarCurso,
}

impl Action for AdminPostAction {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("criarCurso", Self::CriarCurso),
        ("modificarCurso", Self::ModificarCurso),
    ];
}

// --- /auth ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPostAction {
    Login,
    Register,
    Logout,
}

impl Action for AuthPostAction {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("login", Self::Login),
        ("register", Self::Register),
        ("logout", Self::Logout),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGetAction {
    ValidateSession,
}

impl Action for AuthGetAction {
    // "validate" é o nome que o frontend antigo usa
    const TABLE: &'static [(&'static str, Self)] = &[
        ("validateSession", Self::ValidateSession),
        ("validate", Self::ValidateSession),
    ];
}

// --- /course ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseGetAction {
    GetCourse,
    CheckEnrollment,
    GetCourseProgress,
    GetLatestCourses,
}

impl Action for CourseGetAction {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("getCourse", Self::GetCourse),
        ("checkEnrollment", Self::CheckEnrollment),
        ("getCourseProgress", Self::GetCourseProgress),
        ("getLatestCourses", Self::GetLatestCourses),
    ];
}

// --- /courses ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoursesGetAction {
    GetCourses,
}

impl Action for CoursesGetAction {
    const TABLE: &'static [(&'static str, Self)] = &[("getCourses", Self::GetCourses)];
}

// --- /user-course ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCourseGetAction {
    GetUserCourses,
    GetFeaturedCourses,
    CheckEnrollment,
    GetCourseProgress,
}

impl Action for UserCourseGetAction {
    // checkEnrollment/getCourseProgress também respondem aqui: é onde a página do curso os chama
    const TABLE: &'static [(&'static str, Self)] = &[
        ("getUserCourses", Self::GetUserCourses),
        ("getFeaturedCourses", Self::GetFeaturedCourses),
        ("checkEnrollment", Self::CheckEnrollment),
        ("getCourseProgress", Self::GetCourseProgress),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCoursePostAction {
    EnrollCourse,
    MarkAsWatched,
    RemoveEnrollment,
}

impl Action for UserCoursePostAction {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("enrollCourse", Self::EnrollCourse),
        ("markAsWatched", Self::MarkAsWatched),
        ("removeEnrollment", Self::RemoveEnrollment),
    ];
}

// --- Auxiliares partilhados pelos handlers ---

/// Ação de um POST: vem da query string ou, em falta, do campo `action` do corpo.
pub fn post_action<A: Action>(query_action: Option<&str>, body: &Bytes) -> AppResult<A> {
    if query_action.is_some_and(|a| !a.trim().is_empty()) {
        return A::parse(query_action);
    }

    #[derive(Deserialize)]
    struct BodyAction {
        action: Option<String>,
    }

    let from_body = serde_json::from_slice::<BodyAction>(body)
        .ok()
        .and_then(|b| b.action);
    A::parse(from_body.as_deref())
}

/// Corpo JSON do pedido, já no tipo da ação.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Corpo JSON rejeitado: {}", e);
        AppError::BadRequest("Dados JSON inválidos".to_string())
    })
}

/// Resposta simples `{"message": ...}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        MessageResponse { message }
    }
}

/// Lista com contagem, formato usado por várias ações de listagem.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub message: &'static str,
    pub count: usize,
    pub courses: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(message: &'static str, courses: Vec<T>) -> Self {
        ListResponse {
            message,
            count: courses.len(),
            courses,
        }
    }
}
