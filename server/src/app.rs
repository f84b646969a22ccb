//! Core application

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CheckKeyArgs, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::gemini::{self, GenerationClient};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: Arc<AppConfig>,
    pub client: Arc<dyn GenerationClient>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<ExitCode> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::CheckKey(args)) => return Ok(Self::check_key(&args).await),
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config)?;
        Self::start_server(app).await?;
        Ok(ExitCode::SUCCESS)
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = Arc::new(AppConfig::load(cli)?);
        let client = gemini::from_config(&config.gemini);
        tracing::debug!(client = ?client, "Generation client ready");

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            client,
        })
    }

    async fn check_key(args: &CheckKeyArgs) -> ExitCode {
        let report = gemini::check_key(args).await;
        report.print(&args.url);
        ExitCode::from(report.outcome.exit_code())
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        let host = app.config.server.host.as_str();
        let port = app.config.server.port;
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind {host}:{port}"))?;

        banner::print_banner(&app.config);

        ApiServer::new(app).start(listener).await
    }
}
