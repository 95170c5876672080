use axum::{
    extract::{Extension, State},
    response::Html,
};

use tera::Context;
use tower_cookies::Cookies;

use std::sync::Arc;

use crate::{
    AppState, data::model::Admin, error::AppError, phq9::QUESTIONS, router::render_page,
    session,
};

#[axum::debug_handler]
pub async fn index(
    State(state): State<Arc<AppState>>,
    Extension(current_admin): Extension<Option<Admin>>,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let mut context = Context::new();
    context.insert("question_count", &QUESTIONS.len());

    render_page(
        &state,
        &current_admin,
        "MindCheck | Depression Screening",
        "views/index.html",
        &context,
        &session::take_notices(&cookies),
    )
}
