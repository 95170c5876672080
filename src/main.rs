use std::{net::SocketAddr, path::Path, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tera::Tera;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod data;
mod error;
mod forms;
mod middleware;
mod password;
mod phq9;
mod router;
mod session;

use config::{Cli, Command, CreateAdminArgs, ServeArgs};
use data::repository::{AdminRepository, ScreeningRepository};
use error::AppError;
use forms::LoginForm;
use middleware::{extract_admin, handle_error};
use password::AdminCredentials;
use router::app_router;

#[derive(Clone)]
struct AppState {
    tera: Tera,
    key: Key,
    screening_repo: ScreeningRepository,
    admin_repo: AdminRepository,
    credentials: AdminCredentials,
}

impl AppState {
    fn new(pool: SqlitePool, tera: Tera, secret_key: &str) -> Result<Self, AppError> {
        let pool = Arc::new(pool);

        Ok(Self {
            tera,
            key: session::signing_key(secret_key),
            screening_repo: ScreeningRepository { pool: pool.clone() },
            admin_repo: AdminRepository { pool },
            credentials: AdminCredentials::new()?,
        })
    }
}

fn app(state: Arc<AppState>, assets_dir: &Path) -> Router {
    Router::new()
        .nest_service("/assets", ServeDir::new(assets_dir))
        .merge(app_router(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handle_error,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            extract_admin,
        ))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindcheck=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let pool = connect(&cli.database_url).await?;

    match cli.command {
        Command::Serve(args) => serve(pool, args).await,
        Command::CreateAdmin(args) => create_admin(pool, args).await,
    }
}

async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .context("invalid DATABASE_URL")?
        .journal_mode(SqliteJournalMode::Wal)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
        .context("can't connect to database")?;

    data::MIGRATOR
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    Ok(pool)
}

async fn serve(pool: SqlitePool, args: ServeArgs) -> anyhow::Result<()> {
    let templates = args.templates_dir.join("**").join("*");
    let tera = Tera::new(&templates.to_string_lossy()).context("failed to parse templates")?;

    let state = Arc::new(AppState::new(pool, tera, &args.secret_key)?);
    let app = app(state, &args.assets_dir);

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("can't bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn create_admin(pool: SqlitePool, args: CreateAdminArgs) -> anyhow::Result<()> {
    let form = LoginForm {
        username: args.username,
        password: args.password,
    };
    if let Err(errors) = form.validate() {
        let details = errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        anyhow::bail!("invalid admin account: {details}");
    }

    let hash = password::hash_password(&form.password)?;
    let admins = AdminRepository {
        pool: Arc::new(pool),
    };
    let admin_id = admins
        .create(&form.username, &hash)
        .await
        .with_context(|| format!("can't create admin {:?}", form.username))?;

    tracing::info!(admin_id, username = %form.username, "admin created");
    Ok(())
}
