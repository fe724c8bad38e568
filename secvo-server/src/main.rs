use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use secvo_core::{AuthCrypto, PostgresDatabase, StoreContext};
use secvo_server::{
    AppState, create_app,
    infra::{
        config::{Config, ConfigLoad, ConfigLoader},
        startup::{ProdStartupHooks, StartupHooks},
    },
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "secvo-server")]
#[command(about = "Website vulnerability scan dashboard and processing trigger")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Db(DbCommand::Migrate)) = cli.command {
        return run_db_migrate(&cli.serve).await;
    }

    run_server(cli.serve).await
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    let database_url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL is required to run migrations")?;
    let pg = PostgresDatabase::new(database_url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL for migration")?;
    pg.initialize_schema()
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.clone() {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    Ok(Arc::new(config))
}

async fn wire_app_resources(config: Arc<Config>) -> anyhow::Result<AppState> {
    let store = match config.database.url.as_deref() {
        Some(url) => {
            let store =
                StoreContext::connect_postgres(url, config.database.max_connections)
                    .await
                    .context("failed to connect to PostgreSQL")?;
            info!("Successfully connected to PostgreSQL");
            store
        }
        None => {
            warn!("Running against the in-memory store; data will not persist");
            StoreContext::in_memory()
        }
    };

    store
        .initialize_schema()
        .await
        .context("database migration failed")?;
    info!(backend = store.backend_name(), "store ready");

    let crypto = AuthCrypto::new(
        config.auth.password_pepper.as_bytes(),
        config.auth.token_key.as_bytes(),
    )
    .context("failed to initialise authentication crypto")?;

    Ok(AppState::new(config, store, Arc::new(crypto)))
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    run_server_with_hooks(args, &ProdStartupHooks).await
}

async fn run_server_with_hooks<H>(
    args: ServeArgs,
    hooks: &H,
) -> anyhow::Result<()>
where
    H: StartupHooks,
{
    let config = load_runtime_config(&args)?;
    let state = wire_app_resources(Arc::clone(&config)).await?;

    hooks.run(&state).await?;

    info!(
        "Starting Secvo scan service on {}:{}",
        config.server.host, config.server.port
    );
    let listener = tokio::net::TcpListener::bind((
        config.server.host.as_str(),
        config.server.port,
    ))
    .await
    .with_context(|| {
        format!(
            "failed to bind {}:{}",
            config.server.host, config.server.port
        )
    })?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
