use axum::{
    Form,
    extract::{Extension, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use tera::Context;
use tower_cookies::Cookies;

use std::{collections::HashMap, sync::Arc};

use crate::{
    AppState,
    data::model::{Admin, Gender},
    error::AppError,
    forms::{FieldErrors, RespondentForm, parse_answers},
    phq9::{OPTIONS, QUESTIONS, ScoredAnswers},
    router::render_page,
    session::{self, Flash, Notice},
};

fn render_qna(
    state: &AppState,
    current_admin: &Option<Admin>,
    form: &RespondentForm,
    errors: &FieldErrors,
    notices: &[Notice],
) -> Result<Html<String>, AppError> {
    let genders: Vec<&str> = Gender::ALL.iter().map(|g| g.as_str()).collect();

    let mut context = Context::new();
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("questions", &QUESTIONS);
    context.insert("options", &OPTIONS);
    context.insert("genders", &genders);

    render_page(
        state,
        current_admin,
        "Questionnaire | MindCheck",
        "views/qna.html",
        &context,
        notices,
    )
}

#[axum::debug_handler]
pub async fn qna(
    State(state): State<Arc<AppState>>,
    Extension(current_admin): Extension<Option<Admin>>,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    render_qna(
        &state,
        &current_admin,
        &RespondentForm::default(),
        &FieldErrors::new(),
        &session::take_notices(&cookies),
    )
}

/// Respondent problems re-render the form with the entered values; answer problems redirect
/// back with a notice. Nothing is written unless every field and answer is valid.
#[axum::debug_handler]
pub async fn submit_qna(
    State(state): State<Arc<AppState>>,
    Extension(current_admin): Extension<Option<Admin>>,
    cookies: Cookies,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let form = RespondentForm::from_fields(&fields);
    let respondent = match form.validate() {
        Ok(respondent) => respondent,
        Err(errors) => {
            let page = render_qna(&state, &current_admin, &form, &errors, &[])?;
            return Ok(page.into_response());
        }
    };

    let answers = match parse_answers(&fields, QUESTIONS.len()) {
        Ok(answers) => answers,
        Err(err) => {
            tracing::debug!(error = ?err, "questionnaire rejected");
            session::set_flash(&cookies, Flash::from(err));
            return Ok(Redirect::to("/qna").into_response());
        }
    };

    let scored = ScoredAnswers::new(answers);
    let response_id = state
        .screening_repo
        .insert_respondent_and_response(&respondent, &scored)
        .await?;

    tracing::info!(
        response_id,
        score = scored.score,
        flagged = scored.flagged_suicidal_thoughts,
        "questionnaire submitted"
    );

    Ok(Redirect::to(&format!("/result/{response_id}")).into_response())
}
