use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use serde::Serialize;
use tera::Context;
use tower_cookies::Cookies;

use std::sync::Arc;

use crate::{
    AppState,
    data::model::Admin,
    error::AppError,
    phq9::{QUESTIONS, option_label},
    router::render_page,
    session,
};

#[derive(Debug, Serialize)]
struct AnswerRow {
    number: usize,
    question: &'static str,
    value: u8,
    label: &'static str,
}

/// Non-numeric ids are treated the same as unknown ones.
#[axum::debug_handler]
pub async fn result(
    State(state): State<Arc<AppState>>,
    Extension(current_admin): Extension<Option<Admin>>,
    cookies: Cookies,
    Path(response_id): Path<String>,
) -> Result<Response, AppError> {
    let Ok(response_id) = response_id.parse::<i64>() else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let Some(response) = state.screening_repo.get_response(response_id).await? else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let respondent = match response.respondent_id {
        Some(id) => state.screening_repo.get_respondent(id).await?,
        None => None,
    };

    let answers: Vec<AnswerRow> = QUESTIONS
        .iter()
        .zip(response.answers.0.iter())
        .enumerate()
        .map(|(i, (&question, &value))| AnswerRow {
            number: i + 1,
            question,
            value,
            label: option_label(value).unwrap_or(""),
        })
        .collect();

    let mut context = Context::new();
    context.insert("response_id", &response.id);
    context.insert("score", &response.score);
    context.insert("interpretation", &response.interpretation);
    context.insert("flagged", &response.flagged_suicidal_thoughts);
    context.insert("respondent_name", &respondent.and_then(|r| r.name));
    context.insert("answers", &answers);

    let page = render_page(
        &state,
        &current_admin,
        "Your Result | MindCheck",
        "views/result.html",
        &context,
        &session::take_notices(&cookies),
    )?;
    Ok(page.into_response())
}
