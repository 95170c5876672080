use axum::{Router, routing::get};

use std::sync::Arc;

use crate::{AppState, middleware::require_admin};

mod home;
use home::index;
mod qna;
use qna::{qna, submit_qna};
mod result;
use result::result;
mod admin;
use admin::{dashboard, login, login_form, logout};

pub fn app_router(state: Arc<AppState>) -> Router {
    let admin_router = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/logout", get(logout))
        .route_layer(axum::middleware::from_fn(require_admin))
        .route("/login", get(login).post(login_form));

    Router::new()
        .route("/", get(index))
        .route("/qna", get(qna).post(submit_qna))
        .route("/result/{response_id}", get(result))
        .nest("/admin", admin_router)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Arc};

    use axum::{
        Router,
        body::Body,
        http::{HeaderMap, Request, StatusCode, header},
    };
    use tera::Tera;
    use tower::ServiceExt;

    use crate::{AppState, app, data::test_support::memory_pool, password::hash_password};

    const ADMIN_PASSWORD: &str = "correct horse";

    async fn setup() -> (Router, Arc<AppState>) {
        let pool = memory_pool().await;
        let tera = Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*")).unwrap();
        let state = Arc::new(AppState::new(pool, tera, "test secret").unwrap());
        state
            .admin_repo
            .create("admin", &hash_password(ADMIN_PASSWORD).unwrap())
            .await
            .unwrap();

        let assets = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"));
        (app(state.clone(), assets), state)
    }

    struct Reply {
        status: StatusCode,
        headers: HeaderMap,
        body: String,
    }

    impl Reply {
        fn location(&self) -> &str {
            self.headers
                .get(header::LOCATION)
                .unwrap()
                .to_str()
                .unwrap()
        }

        /// `name=value` pairs from every Set-Cookie header, joined for a Cookie header.
        fn cookies(&self) -> String {
            self.headers
                .get_all(header::SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .filter_map(|v| v.split(';').next())
                .collect::<Vec<_>>()
                .join("; ")
        }

        fn set_cookie_headers(&self) -> Vec<String> {
            self.headers
                .get_all(header::SET_COOKIE)
                .iter()
                .map(|v| v.to_str().unwrap().to_string())
                .collect()
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> Reply {
        let resp = router.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        Reply {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }

    async fn get(router: &Router, uri: &str, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        send(router, builder.body(Body::empty()).unwrap()).await
    }

    async fn post_form(router: &Router, uri: &str, body: &str, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        send(router, builder.body(Body::from(body.to_string())).unwrap()).await
    }

    fn questionnaire(answers: &[&str]) -> String {
        let mut body = "name=Ann&email=ann%40example.com&age=34&gender=Female".to_string();
        for (i, answer) in answers.iter().enumerate() {
            body.push_str(&format!("&q{i}={answer}"));
        }
        body
    }

    async fn count(state: &AppState, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&*state.screening_repo.pool)
            .await
            .unwrap()
    }

    async fn log_in(router: &Router) -> String {
        let reply = post_form(
            router,
            "/admin/login",
            "username=admin&password=correct+horse",
            None,
        )
        .await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        reply.cookies()
    }

    #[tokio::test]
    async fn landing_and_questionnaire_render() {
        let (router, _) = setup().await;

        let reply = get(&router, "/", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("MindCheck | Depression Screening"));

        let reply = get(&router, "/qna", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Little interest or pleasure in doing things"));
        assert!(reply.body.contains("name=\"q8\""));
        assert!(reply.body.contains("More than half the days"));
    }

    #[tokio::test]
    async fn stylesheet_is_served() {
        let (router, _) = setup().await;
        let reply = get(&router, "/assets/css/main.css", None).await;
        assert_eq!(reply.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn valid_submission_persists_and_redirects() {
        let (router, state) = setup().await;
        let body = questionnaire(&["0", "1", "2", "1", "0", "1", "2", "1", "3"]);

        let reply = post_form(&router, "/qna", &body, None).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location(), "/result/1");
        assert_eq!(count(&state, "respondents").await, 1);
        assert_eq!(count(&state, "responses").await, 1);

        let response = state.screening_repo.get_response(1).await.unwrap().unwrap();
        let respondent_id = response.respondent_id.unwrap();
        let respondent = state
            .screening_repo
            .get_respondent(respondent_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(respondent.email.as_deref(), Some("ann@example.com"));

        let reply = get(&router, "/result/1", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Moderate (10-14)"));
        assert!(reply.body.contains("Thank you, Ann."));
        assert!(reply.body.contains("crisis line"));
        assert!(reply.body.contains("Nearly every day (3)"));
    }

    #[tokio::test]
    async fn unflagged_submission_has_no_warning() {
        let (router, _) = setup().await;
        let body = questionnaire(&["0"; 9]);

        let reply = post_form(&router, "/qna", &body, None).await;
        let reply = get(&router, reply.location(), None).await;
        assert!(reply.body.contains("Minimal or none (0-4)"));
        assert!(!reply.body.contains("crisis line"));
    }

    #[tokio::test]
    async fn incomplete_answers_save_nothing() {
        let (router, state) = setup().await;
        let body = questionnaire(&["0", "1", "2", "1", "0", "1", "2", "1"]);

        let reply = post_form(&router, "/qna", &body, None).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location(), "/qna");
        assert_eq!(count(&state, "respondents").await, 0);
        assert_eq!(count(&state, "responses").await, 0);

        let cookies = reply.cookies();
        assert!(cookies.contains("mindcheck-flash=incomplete_answers"));
        let reply = get(&router, "/qna", Some(&cookies)).await;
        assert!(reply.body.contains("Please answer all questions."));
    }

    #[tokio::test]
    async fn out_of_range_answer_saves_nothing() {
        let (router, state) = setup().await;
        let body = questionnaire(&["0", "1", "2", "1", "4", "1", "2", "1", "0"]);

        let reply = post_form(&router, "/qna", &body, None).await;
        assert_eq!(reply.location(), "/qna");
        assert!(reply.cookies().contains("mindcheck-flash=invalid_answer"));
        assert_eq!(count(&state, "respondents").await, 0);
        assert_eq!(count(&state, "responses").await, 0);
    }

    #[tokio::test]
    async fn non_numeric_answer_saves_nothing() {
        let (router, state) = setup().await;
        let body = questionnaire(&["0", "1", "two", "1", "0", "1", "2", "1", "0"]);

        let reply = post_form(&router, "/qna", &body, None).await;
        assert_eq!(reply.location(), "/qna");
        assert!(reply.cookies().contains("mindcheck-flash=incomplete_answers"));
        assert_eq!(count(&state, "respondents").await, 0);
    }

    #[tokio::test]
    async fn invalid_respondent_rerenders_form() {
        let (router, state) = setup().await;
        let body = "name=&email=nope&age=200&q0=1";

        let reply = post_form(&router, "/qna", body, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("This field is required."));
        assert!(reply.body.contains("Invalid email address."));
        assert!(reply.body.contains("Number must be between 0 and 120."));
        assert!(reply.body.contains("value=\"nope\""));
        assert_eq!(count(&state, "respondents").await, 0);
    }

    #[tokio::test]
    async fn unknown_result_is_not_found() {
        let (router, _) = setup().await;

        let reply = get(&router, "/result/999", None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert!(reply.body.contains("Not Found"));

        let reply = get(&router, "/result/abc", None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dashboard_requires_login() {
        let (router, _) = setup().await;

        let reply = get(&router, "/admin/dashboard", None).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location(), "/admin/login");

        let reply = get(&router, "/admin/login", Some(&reply.cookies())).await;
        assert!(reply.body.contains("Please log in to access this page."));

        let reply = get(&router, "/admin/logout", None).await;
        assert_eq!(reply.location(), "/admin/login");
    }

    #[tokio::test]
    async fn forged_session_cookie_is_ignored() {
        let (router, _) = setup().await;
        let reply = get(&router, "/admin/dashboard", Some("mindcheck-session=1")).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location(), "/admin/login");
    }

    #[tokio::test]
    async fn login_establishes_session() {
        let (router, _) = setup().await;

        let cookies = log_in(&router).await;
        assert!(cookies.contains("mindcheck-session="));

        let reply = get(&router, "/admin/dashboard", Some(&cookies)).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Logged in successfully!"));
        assert!(reply.body.contains("No responses yet."));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_generically() {
        let (router, _) = setup().await;

        for body in [
            "username=admin&password=wrong+password",
            "username=nobody&password=correct+horse",
        ] {
            let reply = post_form(&router, "/admin/login", body, None).await;
            assert_eq!(reply.status, StatusCode::OK);
            assert!(reply.body.contains("Error: Invalid credentials."));
            assert!(
                reply
                    .set_cookie_headers()
                    .iter()
                    .all(|c| !c.starts_with("mindcheck-session="))
            );
        }
    }

    #[tokio::test]
    async fn short_password_fails_form_validation() {
        let (router, _) = setup().await;
        let reply = post_form(&router, "/admin/login", "username=admin&password=short", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Password must contain at least 8 characters."));
        assert!(!reply.body.contains("Error: Invalid credentials."));
    }

    #[tokio::test]
    async fn dashboard_filters_by_severity() {
        let (router, _) = setup().await;
        post_form(&router, "/qna", &questionnaire(&["3"; 9]), None).await;
        post_form(
            &router,
            "/qna",
            &questionnaire(&["0", "1", "2", "1", "0", "1", "2", "1", "3"]),
            None,
        )
        .await;
        let cookies = log_in(&router).await;

        let reply = get(&router, "/admin/dashboard", Some(&cookies)).await;
        assert!(reply.body.contains("Severe (20-27)"));
        assert!(reply.body.contains("Moderate (10-14)"));
        let newest = reply.body.find("Moderate (10-14)").unwrap();
        let oldest = reply.body.find("Severe (20-27)").unwrap();
        assert!(newest < oldest, "newest submission should be listed first");

        let reply = get(&router, "/admin/dashboard?severity=Severe", Some(&cookies)).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Severe (20-27)"));
        assert!(!reply.body.contains("Moderate (10-14)"));
        assert!(reply.body.contains("ann@example.com"));

        let reply = get(&router, "/admin/dashboard?severity=", Some(&cookies)).await;
        assert!(reply.body.contains("Moderate (10-14)"));
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let (router, _) = setup().await;
        let cookies = log_in(&router).await;

        let reply = get(&router, "/admin/logout", Some(&cookies)).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location(), "/admin/login");
        assert!(
            reply
                .set_cookie_headers()
                .iter()
                .any(|c| c.starts_with("mindcheck-session=") && c.contains("Max-Age=0"))
        );
        assert!(reply.cookies().contains("mindcheck-flash=logged_out"));
    }
}
