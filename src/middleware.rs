use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use tera::Context;
use tower_cookies::Cookies;

use std::sync::Arc;

use crate::{
    AppState,
    data::model::Admin,
    error::AppError,
    router::render_page,
    session::{self, Flash},
};

/// Resolves the session cookie into an `Option<Admin>` request extension.
pub async fn extract_admin(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_admin = match session::current_admin_id(&cookies, &state.key) {
        Some(id) => state.admin_repo.find_by_id(id).await?,
        None => None,
    };

    req.extensions_mut().insert(current_admin);
    Ok(next.run(req).await)
}

pub async fn require_admin(
    Extension(current_admin): Extension<Option<Admin>>,
    cookies: Cookies,
    req: Request,
    next: Next,
) -> Response {
    match current_admin {
        Some(_admin) => next.run(req).await,
        None => {
            session::set_flash(&cookies, Flash::LoginRequired);
            Redirect::to("/admin/login").into_response()
        }
    }
}

/// Replaces the body of any 4xx/5xx response with the HTML error page, keeping the status.
pub async fn handle_error(
    Extension(current_admin): Extension<Option<Admin>>,
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let mut context = Context::new();
    context.insert("status_code", &status.as_u16());
    context.insert(
        "status_text",
        status.canonical_reason().unwrap_or("Something went wrong"),
    );

    match render_page(
        &state,
        &current_admin,
        "Error | MindCheck",
        "views/error.html",
        &context,
        &[],
    ) {
        Ok(page) => (status, page).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render error page");
            status.into_response()
        }
    }
}
