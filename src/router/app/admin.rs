use axum::{
    Form,
    extract::{Extension, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use serde::Deserialize;
use tera::Context;
use tower_cookies::Cookies;

use std::sync::Arc;

use crate::{
    AppState,
    data::{model::Admin, repository::DASHBOARD_LIMIT},
    error::AppError,
    forms::{FieldErrors, LoginForm},
    phq9::Severity,
    router::render_page,
    session::{self, Flash, Notice},
};

fn render_login(
    state: &AppState,
    current_admin: &Option<Admin>,
    form: &LoginForm,
    errors: &FieldErrors,
    notices: &[Notice],
) -> Result<Html<String>, AppError> {
    let mut context = Context::new();
    context.insert("form", form);
    context.insert("errors", errors);

    render_page(
        state,
        current_admin,
        "Admin Login | MindCheck",
        "views/admin_login.html",
        &context,
        notices,
    )
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Extension(current_admin): Extension<Option<Admin>>,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    render_login(
        &state,
        &current_admin,
        &LoginForm::default(),
        &FieldErrors::new(),
        &session::take_notices(&cookies),
    )
}

/// Looks the admin up by exact username. An unknown username still costs one hash
/// verification, and both failures produce the same notice.
async fn authenticate(state: &AppState, form: &LoginForm) -> Result<Option<Admin>, AppError> {
    let admin = state.admin_repo.find_by_username(&form.username).await?;
    let stored_hash = admin.as_ref().map(|a| a.password_hash.as_str());

    let verified = state.credentials.check(stored_hash, &form.password)?;
    Ok(admin.filter(|_| verified))
}

#[axum::debug_handler]
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    Extension(current_admin): Extension<Option<Admin>>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let page = render_login(&state, &current_admin, &form, &errors, &[])?;
        return Ok(page.into_response());
    }

    match authenticate(&state, &form).await? {
        Some(admin) => {
            session::login(&cookies, &state.key, admin.id);
            session::set_flash(&cookies, Flash::LoggedIn);
            tracing::info!(admin_id = admin.id, username = %admin.username, "admin logged in");
            Ok(Redirect::to("/admin/dashboard").into_response())
        }
        None => {
            tracing::warn!(username = %form.username, "failed admin login");
            let page = render_login(
                &state,
                &current_admin,
                &form,
                &FieldErrors::new(),
                &[Flash::InvalidCredentials.notice()],
            )?;
            Ok(page.into_response())
        }
    }
}

pub async fn logout(cookies: Cookies) -> Redirect {
    session::logout(&cookies);
    session::set_flash(&cookies, Flash::LoggedOut);

    Redirect::to("/admin/login")
}

#[derive(Deserialize, Debug)]
pub struct DashboardParams {
    severity: Option<String>,
}

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(current_admin): Extension<Option<Admin>>,
    cookies: Cookies,
    Query(params): Query<DashboardParams>,
) -> Result<Html<String>, AppError> {
    let severity = params.severity.as_deref().filter(|s| !s.is_empty());

    let responses = state
        .screening_repo
        .get_responses_with_respondent(severity, DASHBOARD_LIMIT)
        .await?;

    let severities: Vec<&str> = Severity::ALL.iter().map(|s| s.prefix()).collect();

    let mut context = Context::new();
    context.insert("responses", &responses);
    context.insert("severity", &severity.unwrap_or(""));
    context.insert("severities", &severities);
    context.insert("limit", &DASHBOARD_LIMIT);

    render_page(
        &state,
        &current_admin,
        "Dashboard | MindCheck",
        "views/admin_dashboard.html",
        &context,
        &session::take_notices(&cookies),
    )
}
