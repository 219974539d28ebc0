use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trail_service::config::{config, AppConfig};
use trail_service::database::DatabaseManager;
use trail_service::{app, is_production, AppState};

#[derive(Parser)]
#[command(name = "trail-service")]
#[command(about = "REST API for hiking trails")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, env = "TRAIL_API_PORT", help = "Port to listen on")]
        port: Option<u16>,

        #[arg(long, help = "Address to bind")]
        bind: Option<String>,
    },

    #[command(about = "Apply the database schema and exit")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trail_service=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = config().clone();
    info!("Starting trail service in {:?} mode", settings.environment);

    match cli.command.unwrap_or(Commands::Serve { port: None, bind: None }) {
        Commands::Serve { port, bind } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(bind) = bind {
                settings.server.bind = bind;
            }
            serve(settings).await
        }
        Commands::Migrate => migrate(&settings).await,
    }
}

async fn serve(settings: AppConfig) -> anyhow::Result<()> {
    if is_production!() && settings.database.url.is_none() {
        warn!("Running in production without DATABASE_URL");
    }

    let bind_addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let state = AppState::from_config(settings).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    info!("Trail service listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn migrate(settings: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&settings.database).await?;
    DatabaseManager::migrate(&pool).await?;
    info!("Schema applied");
    Ok(())
}
