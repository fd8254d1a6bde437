// src/models/course.rs
use super::deserialize_optional_id;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// --- Estruturas que espelham as tabelas da DB ---

/// Curso tal como está na tabela `courses`.
/// Os nomes JSON mantêm o contrato antigo do frontend (`idCreator`, `urlImage`).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: i64,
    #[serde(rename = "idCreator")]
    pub creator_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "urlImage")]
    pub url_image: Option<String>,
    pub created_at: NaiveDateTime,
    pub modified_at: NaiveDateTime,
}

/// Curso com o nome do criador (LEFT JOIN em `users`).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CourseWithCreator {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub creator_name: Option<String>,
}

/// Detalhe de um curso, com as datas já formatadas para exibição.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseWithCreator,
    pub created_at_formatted: String,
    pub modified_at_formatted: String,
}

impl From<CourseWithCreator> for CourseDetail {
    fn from(course: CourseWithCreator) -> Self {
        CourseDetail {
            created_at_formatted: format_date(&course.course.created_at),
            modified_at_formatted: format_date(&course.course.modified_at),
            course,
        }
    }
}

/// Formato de data usado pelo frontend (dd/mm/aaaa).
pub fn format_date(ts: &NaiveDateTime) -> String {
    ts.format("%d/%m/%Y").to_string()
}

/// Estado de inscrição anexado a cada curso quando a listagem é pedida por um utilizador.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrollmentFlag {
    pub user_enrolled: bool,
    pub watched_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseListItem {
    #[serde(flatten)]
    pub course: CourseWithCreator,
    // Só presente quando a listagem recebe `userId`
    #[serde(flatten)]
    pub enrollment: Option<EnrollmentFlag>,
}

/// Linha devolvida pela query de listagem (curso + criador + inscrição do utilizador).
#[derive(Debug, FromRow)]
pub struct CourseListRow {
    #[sqlx(flatten)]
    pub course: CourseWithCreator,
    pub user_enrolled: bool,
    pub watched_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoursePage {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub courses: Vec<CourseListItem>,
}

/// Curso em destaque, ordenado pelo número de alunos inscritos.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeaturedCourse {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub student_count: i64,
}

// --- Payloads da API de administração ---

#[derive(Debug, Deserialize)]
pub struct CreateCoursePayload {
    #[serde(rename = "idCreator", default, deserialize_with = "deserialize_optional_id")]
    pub creator_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "urlImage")]
    pub url_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCoursePayload {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: CreateCoursePayload,
}

/// Campos de um curso já validados; usados tanto na criação como na edição
/// (a edição reescreve todos os campos).
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub creator_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub url_image: Option<String>,
}

impl NewCourse {
    /// Valor gravado em `name_search`.
    pub fn name_search(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn description_search(&self) -> Option<String> {
        self.description.as_deref().map(str::to_lowercase)
    }
}

// --- Parâmetros da listagem pública ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CourseSort {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl CourseSort {
    /// Valores desconhecidos caem no padrão (`newest`).
    pub fn parse(raw: Option<&str>) -> CourseSort {
        match raw.map(str::trim) {
            Some("oldest") => CourseSort::Oldest,
            Some("name_asc") => CourseSort::NameAsc,
            Some("name_desc") => CourseSort::NameDesc,
            _ => CourseSort::Newest,
        }
    }

    /// Cláusula ORDER BY; o id desempata cursos criados no mesmo segundo.
    pub fn order_by(&self) -> &'static str {
        match self {
            CourseSort::Newest => "c.created_at DESC, c.id DESC",
            CourseSort::Oldest => "c.created_at ASC, c.id ASC",
            CourseSort::NameAsc => "c.name ASC, c.id ASC",
            CourseSort::NameDesc => "c.name DESC, c.id DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    /// Páginas começam em 1; `limit` fica em [1, 100] (padrão 20).
    /// Números inválidos valem 0 e são depois ajustados.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Pagination {
        let page = page.map(lenient_int).unwrap_or(1).max(1);
        let limit = limit
            .map(lenient_int)
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        Pagination { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Lê o prefixo numérico de um texto ("20abc" -> 20, "abc" -> 0).
pub fn lenient_int(raw: &str) -> i64 {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let value = digits
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .fold(0i64, |acc, c| {
            acc.saturating_mul(10).saturating_add(i64::from(c as u8 - b'0'))
        });
    if negative {
        -value
    } else {
        value
    }
}

/// Filtro completo da listagem pública.
#[derive(Debug, Clone, Default)]
pub struct CourseQuery {
    pub search: Option<String>,
    pub sort: CourseSort,
    pub pagination: Pagination,
}

impl CourseQuery {
    pub fn new(
        search: Option<&str>,
        sort: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> CourseQuery {
        CourseQuery {
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
            sort: CourseSort::parse(sort),
            pagination: Pagination::from_raw(page, limit),
        }
    }
}

/// Padrão LIKE de "contém", com os curingas do utilizador escapados com `\`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
