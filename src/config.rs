use std::{net::IpAddr, path::PathBuf};

use clap::{Args, Parser, Subcommand};

/// PHQ-9 depression screening with an admin dashboard.
#[derive(Debug, Parser)]
#[command(name = "mindcheck", version)]
pub struct Cli {
    /// SQLite connection string, e.g. sqlite://mindcheck.db
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeArgs),
    /// Create an admin account
    CreateAdmin(CreateAdminArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Secret used to sign session cookies
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[arg(long, env = "TEMPLATES_DIR", default_value = "templates")]
    pub templates_dir: PathBuf,

    #[arg(long, env = "ASSETS_DIR", default_value = "assets")]
    pub assets_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}
