use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use surfsup_service::api;
use surfsup_service::config::{Config, DataSourceConfig};
use surfsup_service::db;
use surfsup_service::logging::{self, DataSource};
use surfsup_service::query::QueryService;
use surfsup_service::repository::{InMemoryRepository, MeasurementRepository, PostgresRepository};
use surfsup_service::verify;

#[derive(Parser, Debug)]
#[command(name = "surfsup")]
#[command(about = "Read-only climate API over the Hawaii weather-station dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to the TOML config file (default: ./surfsup.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve {
        /// Address to listen on, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Check the dataset and print a report
    Verify {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let _log_guard = logging::init_logging(&config.logging).context("failed to initialize logging")?;

    // Opened before the runtime exists: the synchronous Postgres client drives
    // its own runtime and must not be created or dropped inside ours.
    let repo = open_repository(&config)?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to start tokio runtime")?;
            runtime.block_on(serve(QueryService::new(Arc::clone(&repo)), &bind))?;
        }
        Command::Verify { json } => {
            let report = verify::run_verification(repo.as_ref())
                .context("dataset verification could not run")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                verify::print_summary(&report);
            }
            if !report.passed() {
                bail!("dataset verification failed");
            }
        }
    }

    Ok(())
}

fn open_repository(config: &Config) -> Result<Arc<dyn MeasurementRepository>> {
    match config.data_source()? {
        DataSourceConfig::Postgres {
            url,
            statement_timeout_secs,
        } => {
            let client = db::connect_and_verify(&url, statement_timeout_secs)
                .context("database setup failed")?;
            Ok(Arc::new(PostgresRepository::new(client)))
        }
        DataSourceConfig::Fixture(path) => {
            let repo = InMemoryRepository::from_toml_file(&path)
                .with_context(|| format!("failed to load fixture {}", path.display()))?;
            info!(
                source = %DataSource::System,
                "serving fixture {} ({} stations, {} measurements)",
                path.display(),
                repo.stations().len(),
                repo.measurements().len()
            );
            Ok(Arc::new(repo))
        }
    }
}

async fn serve(service: QueryService, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    info!(source = %DataSource::System, "listening on http://{}", listener.local_addr()?);

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!(source = %DataSource::System, "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(source = %DataSource::System, "failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!(source = %DataSource::System, "shutdown requested");
}
