use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use treecast_core::config::Config;

mod demo;

#[derive(Parser)]
#[command(
    name = "treecast",
    about = "Server-driven UI over WebSocket — describe the interface as a function of state",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the UI server with a bundled demo app
    Serve {
        /// Which bundled demo app to serve
        #[arg(long, value_enum, default_value = "counter")]
        app: demo::DemoApp,

        /// Port to listen on (default: 8990)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,

        /// Serve static files from this directory
        #[arg(long)]
        static_dir: Option<String>,

        /// Disable static file serving
        #[arg(long)]
        no_static: bool,

        /// Comma-separated list of allowed CORS origins
        #[arg(long)]
        allow_origins: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show effective settings
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a specific config value by dotted path
    Get { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    // Load config
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    let mut config = Config::load(&config_path)?;

    match cli.command {
        Commands::Serve {
            app,
            port,
            bind,
            static_dir,
            no_static,
            allow_origins,
        } => {
            let server = config.server.get_or_insert_with(Default::default);
            if let Some(port) = port {
                server.port = port;
            }
            if let Some(bind) = bind {
                server.bind = Some(bind);
            }
            if let Some(dir) = static_dir {
                server.static_dir = Some(dir);
            }
            if no_static {
                server.mount_static = false;
            }
            if let Some(raw) = allow_origins {
                server.allow_origins = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect();
            }

            let (warnings, errors) = config.validate();
            for warning in &warnings {
                tracing::warn!("{warning}");
            }
            if !errors.is_empty() {
                for error in &errors {
                    tracing::error!("{error}");
                }
                anyhow::bail!("Invalid configuration");
            }

            let bind = config.bind();
            let port = config.port();
            tracing::info!("Starting Treecast demo app: {app:?}");

            let state = Arc::new(treecast_server::ServerState::new(
                Arc::new(config),
                demo::builder(app),
            ));
            treecast_server::start_server(state, &bind, port).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Get { key } => match config.get_path(&key) {
                Some(value) => println!("{value}"),
                None => anyhow::bail!("No config value at '{key}'"),
            },
        },
        Commands::Status => {
            println!("Treecast v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {}", config_path.display());
            println!("Bind: {}:{}", config.bind(), config.port());
            println!("Store: {}", config.store_path().display());
            println!("Secrets file: {}", config.env_file().display());
        }
    }

    Ok(())
}
