use clap::{Parser, Subcommand};
use configuration::StorageBackend;

/// The main entry point for the mahasiswa record service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_config()?;
    let _log_guard = configuration::init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                settings.server.port = port;
            }
            if let Some(storage) = args.storage {
                settings.storage = storage;
            }
            web_server::run_server(settings).await?;
        }
        Commands::Migrate => {
            let pool = database::connect(&settings.database);
            database::run_migrations(&pool).await?;
            tracing::info!("Migrations applied.");
        }
        Commands::CheckDb => {
            let pool = database::connect(&settings.database);
            database::test_connection(&pool).await?;
            tracing::info!(
                host = %settings.database.host,
                database = %settings.database.name,
                "Database connected successfully."
            );
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small REST service for managing student records.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Create or upgrade the `mahasiswa` table.
    Migrate,
    /// Check that the configured database is reachable.
    CheckDb,
}

#[derive(Parser)]
struct ServeArgs {
    /// Port to listen on, overriding PORT and config.toml.
    #[arg(long)]
    port: Option<u16>,

    /// Record store to use, overriding STORAGE_BACKEND.
    #[arg(long, value_enum)]
    storage: Option<StorageBackend>,
}
