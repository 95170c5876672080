use axum::response::Html;
use tera::Context;

use crate::{AppState, data::model::Admin, error::AppError, session::Notice};

mod app;
pub use app::app_router;

/// Renders `view` and wraps it in the site layout.
pub fn render_page(
    state: &AppState,
    current_admin: &Option<Admin>,
    title: &str,
    view: &str,
    context: &Context,
    notices: &[Notice],
) -> Result<Html<String>, AppError> {
    let body = state.tera.render(view, context)?;

    let mut context = Context::new();
    context.insert("title", title);
    context.insert("view", &body);
    context.insert("current_admin", current_admin);
    context.insert("notices", notices);
    let rendered = state.tera.render("views/main.html", &context)?;

    Ok(Html(rendered))
}
