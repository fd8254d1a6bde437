// src/services/course_service.rs
use crate::{
    db,
    error::{AppError, AppResult},
    models::course::{
        like_pattern, Course, CourseDetail, CourseListItem, CourseListRow, CoursePage,
        CourseQuery, CourseWithCreator, EnrollmentFlag, FeaturedCourse, NewCourse,
    },
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub const LATEST_DEFAULT_LIMIT: i64 = 3;
pub const LATEST_MAX_LIMIT: i64 = 10;
pub const FEATURED_LIMIT: i64 = 6;

const COURSE_NOT_FOUND: &str = "Curso não encontrado";
const CREATOR_NOT_FOUND: &str = "Criador não encontrado";

const COURSE_COLUMNS: &str =
    "c.id, c.creator_id, c.name, c.description, c.url_image, c.created_at, c.modified_at";

/// Acrescenta o filtro de busca (nome OU descrição, sem distinguir maiúsculas).
/// Compara com as colunas `*_search`; o termo já chega em minúsculas.
fn push_search_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, search: Option<&'a str>) {
    if let Some(term) = search {
        let pattern = like_pattern(term);
        qb.push(" WHERE (c.name_search LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR c.description_search LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Listagem pública paginada. Com `user_id`, cada curso leva o estado de
/// inscrição desse utilizador, obtido no mesmo JOIN.
pub async fn list_courses(
    db_pool: &SqlitePool,
    query: &CourseQuery,
    user_id: Option<i64>,
) -> AppResult<CoursePage> {
    let pagination = query.pagination;
    tracing::debug!(
        "Listando cursos: busca={:?} ordem={:?} página={} limite={} user={:?}",
        query.search,
        query.sort,
        pagination.page,
        pagination.limit,
        user_id
    );

    // 1. Total de resultados (ignora a paginação)
    let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM courses c");
    push_search_filter(&mut count_qb, query.search.as_deref());
    let total: i64 = count_qb.build_query_scalar().fetch_one(db_pool).await?;

    // 2. Página pedida. Sem user_id o JOIN não encontra nada (uc.user_id = NULL).
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    qb.push(COURSE_COLUMNS)
        .push(
            ", u.nome AS creator_name, \
             uc.id IS NOT NULL AS user_enrolled, uc.watched_at AS watched_at \
             FROM courses c \
             LEFT JOIN users u ON u.id = c.creator_id \
             LEFT JOIN user_courses uc ON uc.course_id = c.id AND uc.user_id = ",
        )
        .push_bind(user_id);
    push_search_filter(&mut qb, query.search.as_deref());
    qb.push(" ORDER BY ")
        .push(query.sort.order_by())
        .push(" LIMIT ")
        .push_bind(pagination.limit)
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let rows: Vec<CourseListRow> = qb.build_query_as().fetch_all(db_pool).await?;

    let courses = rows
        .into_iter()
        .map(|row| CourseListItem {
            course: row.course,
            enrollment: user_id.map(|_| EnrollmentFlag {
                user_enrolled: row.user_enrolled,
                watched_at: row.watched_at,
            }),
        })
        .collect::<Vec<_>>();

    tracing::debug!("{} cursos nesta página (total {}).", courses.len(), total);
    Ok(CoursePage {
        page: pagination.page,
        limit: pagination.limit,
        total,
        courses,
    })
}

/// Busca um curso com o nome do criador.
pub async fn get_course(db_pool: &SqlitePool, course_id: i64) -> AppResult<CourseDetail> {
    tracing::debug!("Buscando curso {}", course_id);
    let course = sqlx::query_as::<_, CourseWithCreator>(
        r#"
        SELECT c.id, c.creator_id, c.name, c.description, c.url_image,
               c.created_at, c.modified_at, u.nome AS creator_name
        FROM courses c
        LEFT JOIN users u ON u.id = c.creator_id
        WHERE c.id = ?1
        "#,
    )
    .bind(course_id)
    .fetch_optional(db_pool)
    .await?
    .ok_or(AppError::NotFound(COURSE_NOT_FOUND))?;

    Ok(CourseDetail::from(course))
}

/// Todos os cursos, mais recentes primeiro (página de administração).
pub async fn list_all_courses(db_pool: &SqlitePool) -> AppResult<Vec<Course>> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, creator_id, name, description, url_image, created_at, modified_at
        FROM courses
        ORDER BY id DESC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Encontrados {} cursos.", courses.len());
    Ok(courses)
}

/// Valida os campos de um curso vindos do pedido.
pub fn validate_course_fields(
    creator_id: Option<i64>,
    name: Option<String>,
    description: Option<String>,
    url_image: Option<String>,
) -> AppResult<NewCourse> {
    let creator_id = creator_id.ok_or(AppError::MissingField("idCreator"))?;
    let name = name.ok_or(AppError::MissingField("name"))?;
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("O nome do curso não pode ficar vazio".to_string()));
    }

    // Texto vazio equivale a ausente
    let non_blank = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(NewCourse {
        creator_id,
        name,
        description: non_blank(description),
        url_image: non_blank(url_image),
    })
}

pub async fn create_course(db_pool: &SqlitePool, new_course: &NewCourse) -> AppResult<Course> {
    tracing::info!("Criando curso '{}' (criador {})", new_course.name, new_course.creator_id);
    let result = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (creator_id, name, description, url_image,
                             name_search, description_search)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id, creator_id, name, description, url_image, created_at, modified_at
        "#,
    )
    .bind(new_course.creator_id)
    .bind(&new_course.name)
    .bind(&new_course.description)
    .bind(&new_course.url_image)
    .bind(new_course.name_search())
    .bind(new_course.description_search())
    .fetch_one(db_pool)
    .await;

    match result {
        Ok(course) => {
            tracing::info!("✅ Curso {} criado.", course.id);
            Ok(course)
        }
        Err(e) if db::is_foreign_key_violation(&e) => {
            tracing::warn!("Criador {} inexistente.", new_course.creator_id);
            Err(AppError::NotFound(CREATOR_NOT_FOUND))
        }
        Err(e) => Err(e.into()),
    }
}

/// Reescreve todos os campos do curso e atualiza `modified_at`.
pub async fn update_course(
    db_pool: &SqlitePool,
    course_id: i64,
    fields: &NewCourse,
) -> AppResult<()> {
    tracing::info!("Atualizando curso {}", course_id);
    let result = sqlx::query(
        r#"
        UPDATE courses
        SET creator_id = ?1,
            name = ?2,
            description = ?3,
            url_image = ?4,
            name_search = ?5,
            description_search = ?6,
            modified_at = CURRENT_TIMESTAMP
        WHERE id = ?7
        "#,
    )
    .bind(fields.creator_id)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(&fields.url_image)
    .bind(fields.name_search())
    .bind(fields.description_search())
    .bind(course_id)
    .execute(db_pool)
    .await;

    let rows_affected = match result {
        Ok(done) => done.rows_affected(),
        Err(e) if db::is_foreign_key_violation(&e) => {
            return Err(AppError::NotFound(CREATOR_NOT_FOUND));
        }
        Err(e) => return Err(e.into()),
    };

    if rows_affected == 0 {
        tracing::warn!("Falha ao atualizar: curso {} não encontrado.", course_id);
        return Err(AppError::NotFound(COURSE_NOT_FOUND));
    }
    tracing::info!("✅ Curso {} atualizado.", course_id);
    Ok(())
}

/// Apaga o curso; as inscrições caem junto (ON DELETE CASCADE).
pub async fn delete_course(db_pool: &SqlitePool, course_id: i64) -> AppResult<()> {
    tracing::info!("Apagando curso {}", course_id);
    let rows_affected = sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(course_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::NotFound(COURSE_NOT_FOUND));
    }
    tracing::info!("🗑️ Curso {} apagado.", course_id);
    Ok(())
}

/// Últimos cursos criados (slider da home). `limit` fica em [1, 10].
pub async fn latest_courses(
    db_pool: &SqlitePool,
    limit: Option<i64>,
) -> AppResult<Vec<CourseWithCreator>> {
    let limit = limit
        .unwrap_or(LATEST_DEFAULT_LIMIT)
        .clamp(1, LATEST_MAX_LIMIT);
    let courses = sqlx::query_as::<_, CourseWithCreator>(
        r#"
        SELECT c.id, c.creator_id, c.name, c.description, c.url_image,
               c.created_at, c.modified_at, u.nome AS creator_name
        FROM courses c
        LEFT JOIN users u ON u.id = c.creator_id
        ORDER BY c.created_at DESC, c.id DESC
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(db_pool)
    .await?;
    Ok(courses)
}

/// Cursos com mais inscritos; empate resolvido pelos mais recentes.
pub async fn featured_courses(db_pool: &SqlitePool) -> AppResult<Vec<FeaturedCourse>> {
    let courses = sqlx::query_as::<_, FeaturedCourse>(
        r#"
        SELECT c.id, c.creator_id, c.name, c.description, c.url_image,
               c.created_at, c.modified_at, COUNT(uc.id) AS student_count
        FROM courses c
        LEFT JOIN user_courses uc ON uc.course_id = c.id
        GROUP BY c.id
        ORDER BY student_count DESC, c.created_at DESC, c.id DESC
        LIMIT ?1
        "#,
    )
    .bind(FEATURED_LIMIT)
    .fetch_all(db_pool)
    .await?;
    Ok(courses)
}
