mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

/// Curso criado pelo admin e um aluno com sessão aberta.
async fn setup(app: &TestApp) -> (i64, i64, String, String) {
    let (admin_id, admin_cookie) = app.login_admin().await;
    let course_id = app.create_course(&admin_cookie, admin_id, "Física").await;
    let aluno_id = app.register("Aluno", "aluno@cursos.test", "segredo1").await;
    let cookie = app.login("aluno@cursos.test", "segredo1").await;
    (course_id, aluno_id, cookie, admin_cookie)
}

async fn enroll(
    app: &TestApp,
    user_id: i64,
    course_id: i64,
    cookie: Option<&str>,
) -> common::TestResponse {
    app.post_json(
        "/user-course?action=enrollCourse",
        json!({ "userId": user_id, "courseId": course_id }),
        cookie,
    )
    .await
}

#[tokio::test]
async fn enroll_watch_and_remove() {
    let app = TestApp::new().await;
    let (course_id, aluno_id, cookie, _) = setup(&app).await;

    let resp = enroll(&app, aluno_id, course_id, Some(&cookie)).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["message"], "Inscrição realizada com sucesso");
    let enrollment_id = resp.body["enrollmentId"].as_i64().expect("enrollmentId");

    let resp = enroll(&app, aluno_id, course_id, Some(&cookie)).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["kind"], "already_enrolled");
    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_courses WHERE user_id = ?1 AND course_id = ?2",
    )
    .bind(aluno_id)
    .bind(course_id)
    .fetch_one(&app.pool)
    .await
    .expect("contagem");
    assert_eq!(rows, 1);

    let check = format!(
        "/course?action=checkEnrollment&userId={}&courseId={}",
        aluno_id, course_id
    );
    let resp = app.get(&check, Some(&cookie)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["enrolled"], true);
    assert!(resp.body["watched_at"].is_null());

    let progress = format!(
        "/course?action=getCourseProgress&userId={}&courseId={}",
        aluno_id, course_id
    );
    let resp = app.get(&progress, Some(&cookie)).await;
    assert_eq!(resp.body["progress"], 0);
    assert_eq!(resp.body["total_lessons"], 10);
    assert_eq!(resp.body["completed_lessons"], 0);

    let resp = app
        .post_json(
            "/user-course?action=markAsWatched",
            json!({ "userCourseId": enrollment_id }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Curso marcado como assistido");

    let resp = app.get(&progress, Some(&cookie)).await;
    assert_eq!(resp.body["progress"], 100);
    assert_eq!(resp.body["completed_lessons"], 10);
    let watched_at = resp.body["watched_at"].clone();
    assert!(watched_at.is_string());

    // Marcar de novo não muda a data
    let resp = app
        .post_json(
            "/user-course?action=markAsWatched",
            json!({ "userCourseId": enrollment_id.to_string() }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let resp = app.get(&progress, Some(&cookie)).await;
    assert_eq!(resp.body["watched_at"], watched_at);

    // Mesmas ações também em /user-course
    let resp = app
        .get(
            &format!(
                "/user-course?action=getCourseProgress&userId={}&courseId={}",
                aluno_id, course_id
            ),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.body["progress"], 100);

    let resp = app
        .post_json(
            "/user-course?action=removeEnrollment",
            json!({ "userCourseId": enrollment_id }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Inscrição removida com sucesso");

    let resp = app.get(&check, Some(&cookie)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["kind"], "not_enrolled");

    let resp = app
        .post_json(
            "/user-course?action=removeEnrollment",
            json!({ "userCourseId": enrollment_id }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn enrollment_requires_own_session() {
    let app = TestApp::new().await;
    let (course_id, aluno_id, cookie, admin_cookie) = setup(&app).await;

    let resp = enroll(&app, aluno_id, course_id, None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let outro_id = app.register("Outro", "outro@cursos.test", "segredo1").await;
    let resp = enroll(&app, outro_id, course_id, Some(&cookie)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    // O admin pode inscrever qualquer aluno
    let resp = enroll(&app, outro_id, course_id, Some(&admin_cookie)).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let enrollment_id = resp.body["enrollmentId"].as_i64().expect("enrollmentId");

    // Mas um aluno não mexe na inscrição de outro
    let resp = app
        .post_json(
            "/user-course?action=markAsWatched",
            json!({ "userCourseId": enrollment_id }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .get(
            &format!("/user-course?action=getUserCourses&userId={}", outro_id),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn enroll_in_missing_course_or_missing_fields() {
    let app = TestApp::new().await;
    let (_, aluno_id, cookie, _) = setup(&app).await;

    let resp = enroll(&app, aluno_id, 9999, Some(&cookie)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app
        .post_json(
            "/user-course?action=enrollCourse",
            json!({ "userId": aluno_id }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["kind"], "missing_field");

    let resp = app
        .post_json(
            "/user-course?action=markAsWatched",
            json!({ "userCourseId": 9999 }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_courses_and_featured() {
    let app = TestApp::new().await;
    let (course_id, aluno_id, cookie, admin_cookie) = setup(&app).await;
    let (admin_id, _) = app.login_admin().await;
    let outro_curso = app.create_course(&admin_cookie, admin_id, "Geografia").await;

    enroll(&app, aluno_id, course_id, Some(&cookie)).await;
    let resp = enroll(&app, aluno_id, outro_curso, Some(&cookie)).await;
    let watched_id = resp.body["enrollmentId"].as_i64().expect("enrollmentId");
    app.post_json(
        "/user-course?action=markAsWatched",
        json!({ "userCourseId": watched_id }),
        Some(&cookie),
    )
    .await;

    let outro_id = app.register("Outro", "outro@cursos.test", "segredo1").await;
    let outro_cookie = app.login("outro@cursos.test", "segredo1").await;
    enroll(&app, outro_id, course_id, Some(&outro_cookie)).await;

    let resp = app
        .get(
            &format!("/user-course?action=getUserCourses&userId={}", aluno_id),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["count"], 2);
    // Concluídos primeiro
    assert_eq!(resp.body["courses"][0]["name"], "Geografia");
    assert_eq!(resp.body["courses"][0]["progress"], 100);
    assert_eq!(resp.body["courses"][1]["progress"], 0);
    assert_eq!(resp.body["courses"][0]["user_course_id"], watched_id);

    // Destaques são públicos
    let resp = app.get("/user-course?action=getFeaturedCourses", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["courses"][0]["name"], "Física");
    assert_eq!(resp.body["courses"][0]["student_count"], 2);
    assert_eq!(resp.body["courses"][1]["student_count"], 1);
}

#[tokio::test]
async fn deleting_course_removes_enrollments() {
    let app = TestApp::new().await;
    let (course_id, aluno_id, cookie, admin_cookie) = setup(&app).await;
    enroll(&app, aluno_id, course_id, Some(&cookie)).await;

    let resp = app
        .get(
            &format!("/admin?action=deletarCurso&id={}", course_id),
            Some(&admin_cookie),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .get(
            &format!("/user-course?action=getUserCourses&userId={}", aluno_id),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.body["count"], 0);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_courses")
        .fetch_one(&app.pool)
        .await
        .expect("contagem");
    assert_eq!(remaining, 0);
}
