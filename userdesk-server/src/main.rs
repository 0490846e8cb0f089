//! # Userdesk Server
//!
//! Current-user profile service.
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - PostgreSQL for user records, credentials and subscriptions
//! - Argon2id with a server-side pepper for password storage
//! - HS256 JWT bearer tokens for authentication

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};

use userdesk_core::{
    database::{PoolSettings, PostgresDatabase, UsersRepository},
    domain::users::{User, auth::PasswordCrypto},
};
use userdesk_server::{
    AppState,
    infra::{
        config::{Config, ConfigLoad, ConfigLoader},
        telemetry::init_tracing,
    },
    routes,
};

const NEW_PASSWORD_ENV: &str = "USERDESK_NEW_PASSWORD";

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "userdesk-server")]
#[command(about = "Current-user profile service")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "USERDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Dotenv file to load instead of `./.env`
    #[arg(long, global = true, env = "USERDESK_ENV_FILE")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum UsersCommand {
    /// Create an account
    Create(CreateUserArgs),
}

/// The initial password is read from [`NEW_PASSWORD_ENV`] only, never argv.
#[derive(ClapArgs, Debug)]
struct CreateUserArgs {
    #[arg(long)]
    email: String,

    #[arg(long, default_value = "")]
    first_name: String,

    #[arg(long, default_value = "")]
    last_name: String,

    /// Grant staff privileges
    #[arg(long, default_value_t = false)]
    staff: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config =
        load_runtime_config(cli.config.as_deref(), cli.env_file.as_deref())?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        Some(Command::Users(UsersCommand::Create(args))) => {
            run_create_user(&config, args).await
        }
        Some(Command::Serve(args)) => run_server(config, args).await,
        None => run_server(config, cli.serve).await,
    }
}

fn load_runtime_config(
    config_path: Option<&Path>,
    env_file: Option<&Path>,
) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = env_file {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad { config, warnings } =
        loader.load().context("failed to load configuration")?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(
                    message = %warning.message,
                    hint = %hint,
                    "configuration warning"
                )
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(config)
}

async fn connect(config: &Config) -> anyhow::Result<PostgresDatabase> {
    let settings = PoolSettings {
        max_connections: config.database.max_connections,
        ..PoolSettings::default()
    };
    PostgresDatabase::new(&config.database.url, settings)
        .await
        .context("failed to connect to PostgreSQL")
}

fn password_crypto(config: &Config) -> anyhow::Result<Arc<PasswordCrypto>> {
    let crypto = PasswordCrypto::new(config.auth.password_pepper.as_bytes())
        .context("failed to initialize password hashing")?;
    Ok(Arc::new(crypto))
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pg = connect(config).await?;
    pg.initialize_schema()
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_create_user(
    config: &Config,
    args: CreateUserArgs,
) -> anyhow::Result<()> {
    let password = std::env::var(NEW_PASSWORD_ENV).with_context(|| {
        format!("{NEW_PASSWORD_ENV} must hold the initial password")
    })?;
    let pg = connect(config).await?;
    let crypto = password_crypto(config)?;

    let mut user = User::new(args.email.trim());
    user.first_name = args.first_name;
    user.last_name = args.last_name;
    user.is_staff = args.staff;

    let hash = crypto
        .hash_password(&password)
        .context("failed to hash password")?;
    pg.users()
        .create_user_with_password(&user, &hash)
        .await
        .with_context(|| format!("failed to create user {}", user.email))?;

    info!(
        user_id = %user.id,
        email = %user.email,
        staff = user.is_staff,
        "user created"
    );
    Ok(())
}

async fn run_server(mut config: Config, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    let pg = connect(&config).await?;
    pg.initialize_schema()
        .await
        .context("database migration failed")?;

    let config = Arc::new(config);
    let state = AppState::new(
        config.clone(),
        Arc::new(pg.users().clone()),
        Arc::new(pg.subscriptions().clone()),
        password_crypto(&config)?,
    )?;

    let app = routes::build_app(state);

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    let addr: SocketAddr = listener
        .local_addr()
        .context("listener has no local address")?;

    info!(%addr, "userdesk server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
