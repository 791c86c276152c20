//! Foo service: CLI server and migration tool
//!
//! ```sh
//! # Run with default config (~/.config/foo-service/config.toml)
//! foo-service
//!
//! # Custom config path and port
//! foo-service --config /etc/foo-service/config.toml serve --port 9090
//!
//! # Validate config without starting
//! foo-service serve --check
//!
//! # Schema management
//! foo-service migrate status
//! foo-service migrate up
//! foo-service migrate down --steps 1 --allow-down
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use foo_service::config::{AppConfig, StorageBackend};
use foo_service::infrastructure::database::migrator::Migrator;
use foo_service::init_database;
use foo_service::server::{init_tracing, ServerHandle, ServerOptions};

/// Foo service: CRUD REST API for Foo resources.
#[derive(Parser, Debug)]
#[command(
    name = "foo-service",
    version,
    about = "CRUD REST API for Foo resources",
    long_about = "Foo service: REST API for Foo resources scoped by organization \
                  and namespace, plus schema migration commands.\n\n\
                  Default config: ~/.config/foo-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, env = "FOO_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve(ServeArgs),
    /// Apply, roll back or inspect schema migrations.
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the REST API listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[derive(Subcommand, Debug)]
enum MigrateAction {
    /// Apply pending migrations.
    Up {
        /// Apply at most N migrations (all when omitted).
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations.
    Down {
        /// Number of migrations to roll back.
        #[arg(long, default_value_t = 1)]
        steps: u32,
        /// Required: rolling back drops data.
        #[arg(long)]
        allow_down: bool,
    },
    /// List migrations and whether they are applied.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(foo_service::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    match cli.command {
        Some(Command::Migrate { action }) => migrate(&config, action).await,
        Some(Command::Serve(args)) => serve(config, &config_path, args).await,
        None => serve(config, &config_path, ServeArgs::default()).await,
    }
}

async fn serve(
    mut config: AppConfig,
    config_path: &std::path::Path,
    args: ServeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = args.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    if args.check {
        config.validate()?;
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Base path   : {}", config.server.base_path);
        println!("   Backend     : {:?}", config.database.backend);
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    let auto_migrate = config.database.migrate_on_start && !args.no_migrate;
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}

async fn migrate(config: &AppConfig, action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    if config.database.backend == StorageBackend::Memory {
        return Err("migrations need a SQL database; database.backend is \"memory\"".into());
    }

    let db = init_database(&config.database.pool_config()).await?;

    match action {
        MigrateAction::Up { steps } => {
            Migrator::up(&db, steps).await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down { steps, allow_down } => {
            if !allow_down {
                return Err("refusing to roll back without --allow-down".into());
            }
            Migrator::down(&db, Some(steps)).await?;
            info!("Rolled back {} migration(s)", steps);
        }
        MigrateAction::Status => {
            for migration in Migrator::get_migration_with_status(&db).await? {
                println!("{:<40} {:?}", migration.name(), migration.status());
            }
        }
    }

    db.close().await?;
    Ok(())
}
