//! Reusable Foo service runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the full server lifecycle:
//! metrics recorder, storage backend, migrations, REST API, and graceful
//! shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::FooService;
use crate::config::{AppConfig, BuildInfo, ConfigError, StorageBackend};
use crate::domain::FooRepository;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{
    init_database, InMemoryFooRepository, SeaOrmFooRepository, SystemClock, UuidGenerator,
};
use crate::interfaces::http::modules::foo::foo_list_config;
use crate::interfaces::http::{create_api_router, RouterDeps};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("metrics recorder: {0}")]
    Metrics(String),
}

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the Foo service.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup. Ignored for the memory backend.
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        let config = AppConfig::default();
        let auto_migrate = config.database.migrate_on_start;
        Self {
            config,
            auto_migrate,
        }
    }
}

// ── Storage wiring ─────────────────────────────────────────────────

/// Repository plus the connection backing it, if any.
pub struct Storage {
    pub repo: Arc<dyn FooRepository>,
    pub db: Option<DatabaseConnection>,
}

/// Open the configured backend and run migrations when asked.
pub async fn open_storage(config: &AppConfig, auto_migrate: bool) -> Result<Storage, ServerError> {
    match config.database.backend {
        StorageBackend::Memory => {
            info!("Storage: in-memory (data is lost on exit)");
            Ok(Storage {
                repo: Arc::new(InMemoryFooRepository::new()),
                db: None,
            })
        }
        StorageBackend::Sqlite => {
            info!(url = %config.database.url, "Storage: SQL database");
            let db = init_database(&config.database.pool_config()).await?;
            if auto_migrate {
                info!("Running database migrations...");
                Migrator::up(&db, None).await?;
                info!("Migrations completed");
            }
            Ok(Storage {
                repo: Arc::new(SeaOrmFooRepository::new(db.clone())),
                db: Some(db),
            })
        }
    }
}

/// Process-wide Prometheus recorder. Installed on first use, reused after.
pub fn prometheus_handle() -> Result<PrometheusHandle, ServerError> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;
    info!("Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running Foo service.
///
/// ```rust,no_run
/// use foo_service::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the REST API is bound to.
    pub local_addr: SocketAddr,
    pub service: Arc<FooService>,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the service:
    ///
    /// 1. Install the Prometheus recorder
    /// 2. Open storage and run migrations
    /// 3. Build the service and router
    /// 4. Bind and serve until shutdown is triggered
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        let build = Arc::new(BuildInfo::current());
        info!(version = %build.version, commit = %build.commit, "Starting Foo service...");

        let prometheus = prometheus_handle()?;

        let storage = open_storage(&app_cfg, opts.auto_migrate).await?;
        let service = Arc::new(FooService::new(
            storage.repo,
            Arc::new(SystemClock),
            Arc::new(UuidGenerator),
        ));

        let api_router = create_api_router(RouterDeps {
            foo_service: Arc::clone(&service),
            list_config: foo_list_config(app_cfg.list.default_limit, app_cfg.list.max_limit),
            base_path: app_cfg.server.base_path.clone(),
            build,
            prometheus: Some(prometheus),
        });

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);

        let api_addr = app_cfg.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: api_addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: api_addr.clone(),
            source,
        })?;
        info!("REST API listening on http://{}{}", local_addr, app_cfg.server.base_path);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config: app_cfg,
            local_addr,
            service,
            db: storage.db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered,
    /// bounded by `server.shutdown_timeout`.
    pub async fn wait(self) {
        info!("Waiting for in-flight requests to complete...");

        let api_task = self.api_task;
        let completed = self
            .shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;
        if !completed {
            warn!("Abandoning in-flight requests");
        }

        if let Some(db) = self.db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        }

        info!("Foo service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down Foo service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// `RUST_LOG` wins over `logging.level`. Call once at process startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
