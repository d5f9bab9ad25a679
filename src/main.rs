use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use fileshelf::file::resolve_storage_root;
use fileshelf::web::WebServer;
use fileshelf::{Config, Database, FileRepository, FileService, FileStorage, ShelfError};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    // Load configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(ShelfError::Io(e)) => {
            eprintln!("Failed to load {}: {e}", config_path.display());
            eprintln!("Using default configuration.");
            Config::default()
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.apply_env_overrides().and_then(|_| config.validate()) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = fileshelf::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        fileshelf::logging::init_console_only(&config.logging.level);
    }

    info!("fileshelf - owner-scoped file service");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> fileshelf::Result<()> {
    let db = Database::open(config.database.resolve_path()).await?;

    let storage_root = resolve_storage_root(config.files.storage_path.as_deref());
    info!("File storage at {}", storage_root.display());
    let storage = FileStorage::new(storage_root)?;

    let files = FileService::from_config(
        Arc::new(storage),
        Arc::new(FileRepository::new(db.pool().clone())),
        &config.files,
    )?;
    info!(
        max_file_size = files.policy().max_size_bytes(),
        allowed_types = ?files.policy().allowed_types(),
        "Upload policy loaded"
    );

    let server = WebServer::new(&config.server, &config.auth, Arc::new(files))?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    server.run().await?;
    Ok(())
}
