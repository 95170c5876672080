use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, Transaction, types::Json};

use super::model::{Admin, Gender, NewRespondent, Respondent, Response, ResponseWithRespondent};
use crate::phq9::ScoredAnswers;

/// Upper bound on rows shown on the admin dashboard.
pub const DASHBOARD_LIMIT: i64 = 200;

#[derive(Clone)]
pub struct ScreeningRepository {
    pub pool: Arc<SqlitePool>,
}

impl ScreeningRepository {
    /// Stores the respondent and their scored answers in a single transaction and returns the
    /// new response id. Either both rows are committed or neither is.
    pub async fn insert_respondent_and_response(
        &self,
        respondent: &NewRespondent,
        scored: &ScoredAnswers,
    ) -> sqlx::Result<i64> {
        let mut tx: Transaction<Sqlite> = self.pool.begin().await?;

        let respondent_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO respondents (name, email, age, gender)
            VALUES (?, ?, ?, ?) RETURNING id;
            "#,
        )
        .bind(&respondent.name)
        .bind(&respondent.email)
        .bind(respondent.age)
        .bind(respondent.gender.map(Gender::as_str))
        .fetch_one(&mut *tx)
        .await?;

        let response_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO responses (respondent_id, answers, score, interpretation, flagged_suicidal_thoughts)
            VALUES (?, ?, ?, ?, ?) RETURNING id;
            "#,
        )
        .bind(respondent_id)
        .bind(Json(&scored.answers))
        .bind(scored.score)
        .bind(scored.interpretation)
        .bind(scored.flagged_suicidal_thoughts)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(response_id)
    }

    pub async fn get_response(&self, response_id: i64) -> sqlx::Result<Option<Response>> {
        sqlx::query_as::<_, Response>(
            r#"
            SELECT id, respondent_id, submitted_at, answers, score, interpretation, flagged_suicidal_thoughts
            FROM responses WHERE id = ?
            "#,
        )
        .bind(response_id)
        .fetch_optional(&*self.pool)
        .await
    }

    pub async fn get_respondent(&self, respondent_id: i64) -> sqlx::Result<Option<Respondent>> {
        sqlx::query_as::<_, Respondent>(
            "SELECT id, name, email, age, gender, created_at FROM respondents WHERE id = ?",
        )
        .bind(respondent_id)
        .fetch_optional(&*self.pool)
        .await
    }

    /// Most recent responses first, optionally restricted to interpretations starting with
    /// `severity_prefix`. The prefix match is literal and case-sensitive.
    pub async fn get_responses_with_respondent(
        &self,
        severity_prefix: Option<&str>,
        limit: i64,
    ) -> sqlx::Result<Vec<ResponseWithRespondent>> {
        sqlx::query_as::<_, ResponseWithRespondent>(
            r#"
            SELECT responses.id, responses.submitted_at, responses.score, responses.interpretation,
                   responses.flagged_suicidal_thoughts, responses.respondent_id,
                   respondents.name, respondents.email, respondents.age, respondents.gender
            FROM responses
            LEFT JOIN respondents ON respondents.id = responses.respondent_id
            WHERE ?1 IS NULL OR substr(responses.interpretation, 1, length(?1)) = ?1
            ORDER BY responses.submitted_at DESC, responses.id DESC
            LIMIT ?2
            "#,
        )
        .bind(severity_prefix)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await
    }
}

#[derive(Clone)]
pub struct AdminRepository {
    pub pool: Arc<SqlitePool>,
}

impl AdminRepository {
    pub async fn find_by_username(&self, username: &str) -> sqlx::Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>(
            "SELECT id, username, password_hash, created_at FROM admins WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
    }

    pub async fn find_by_id(&self, admin_id: i64) -> sqlx::Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>(
            "SELECT id, username, password_hash, created_at FROM admins WHERE id = ?",
        )
        .bind(admin_id)
        .fetch_optional(&*self.pool)
        .await
    }

    pub async fn create(&self, username: &str, password_hash: &str) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO admins (username, password_hash) VALUES (?, ?) RETURNING id;",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&*self.pool)
        .await
    }
}
