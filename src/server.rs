//! Server runtime
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, database
//! and migrations, event bus, reservation service, REST API and graceful
//! shutdown.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{EventBus, EventSubscriber, ReservationService, SharedEventBus};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, SeaOrmRepositoryProvider};
use crate::interfaces::http::create_api_router;
use crate::shared::{listen_for_shutdown_signals, InfraError, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run pending migrations before serving (default: true)
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running reservation server.
///
/// ```rust,no_run
/// use parking_reservations::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub service: Arc<ReservationService>,
    pub config: AppConfig,
    /// Address the API is bound to
    pub address: std::net::SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownSignal,
    api_task: JoinHandle<()>,
    notifier_task: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, InfraError> {
        let app_cfg = opts.config;
        info!("Starting parking reservation service...");

        let prometheus = prometheus_handle()?;

        // ── Database ───────────────────────────────────────────
        let db_config = app_cfg.database_config();
        info!(url = %db_config.url, "Connecting to database");
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Repositories, events, services ─────────────────────
        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let event_bus: SharedEventBus =
            Arc::new(EventBus::with_capacity(app_cfg.reservations.event_bus_capacity));
        let service = Arc::new(
            ReservationService::new(repos.clone(), event_bus.clone()).with_retry(app_cfg.retry_config()),
        );

        let shutdown = ShutdownSignal::new();
        let notifier_task = spawn_event_logger(event_bus.subscribe(), shutdown.clone());

        // ── REST API ───────────────────────────────────────────
        let router = create_api_router(service.clone(), Some(db.clone()), prometheus);
        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let address = listener.local_addr()?;
        info!("REST API listening on http://{}", address);
        info!("Swagger UI available at http://{}/swagger-ui/", address);

        let api_shutdown = shutdown.clone();
        let api_task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                api_shutdown.wait().await;
                info!("REST API received shutdown signal");
            });
            if let Err(e) = server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            event_bus,
            repos,
            service,
            config: app_cfg,
            address,
            db,
            shutdown,
            api_task,
            notifier_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Trigger shutdown on SIGTERM / SIGINT
    pub fn install_signal_handler(&self) {
        tokio::spawn(listen_for_shutdown_signals(self.shutdown.clone()));
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the API to stop, giving in-flight requests
    /// `server.shutdown_timeout` seconds once shutdown is triggered.
    pub async fn wait(self) {
        let drain = std::time::Duration::from_secs(self.config.server.shutdown_timeout);
        let mut api_task = self.api_task;

        tokio::select! {
            result = &mut api_task => {
                if let Err(e) = result {
                    error!("REST API task panicked: {}", e);
                }
            }
            _ = self.shutdown.wait() => {
                match tokio::time::timeout(drain, &mut api_task).await {
                    Ok(Ok(())) => info!("REST API stopped"),
                    Ok(Err(e)) => error!("REST API task panicked: {}", e),
                    Err(_) => {
                        warn!(timeout_secs = drain.as_secs(), "Drain timed out, aborting API task");
                        api_task.abort();
                    }
                }
            }
        }

        self.shutdown.trigger();
        if let Err(e) = self.notifier_task.await {
            warn!("Event logger task failed: {}", e);
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("Parking reservation service shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can be installed once per process; later starts reuse it.
fn prometheus_handle() -> Result<PrometheusHandle, InfraError> {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| InfraError::Metrics(e.to_string()))?;
    info!("Prometheus metrics recorder installed");
    Ok(HANDLE.get_or_init(|| handle).clone())
}

/// Log every lifecycle event until shutdown. Delivery to drivers and
/// operators is left to external consumers of the bus.
fn spawn_event_logger(mut subscriber: EventSubscriber, shutdown: ShutdownSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                message = subscriber.recv() => match message {
                    Some(msg) => info!(
                        event_id = %msg.id,
                        event = msg.event.event_type(),
                        reservation_id = msg.event.reservation_id(),
                        "Reservation event"
                    ),
                    None => break,
                },
                _ = shutdown.wait() => break,
            }
        }
    })
}

/// Initialize tracing from the logging section. `RUST_LOG` wins over
/// `logging.level`.
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
