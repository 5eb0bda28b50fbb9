//! Daemon: Main runtime orchestrator.
//!
//! The Daemon ties together all components:
//! - Storage backend (memory or JSON file)
//! - Repositories and resolvers (constructed once, injected downward)
//! - API Server (GraphQL over HTTP)
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Open the storage backend
//! 3. Build repositories, resolvers and schema
//! 4. Start API server
//! 5. Wait for SIGINT, then drain in-flight requests and stop

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use grocery_store::{BackendRepositories, JsonFileBackend, MemoryBackend, StorageBackend};

use crate::api::{create_router, ApiState};
use crate::config::{Config, StorageConfig};
use crate::error::{DaemonError, DaemonResult};
use crate::resolvers::Resolvers;
use crate::schema::{build_schema, GrocerySchema};

// =============================================================================
// Daemon
// =============================================================================

/// The main grocery daemon.
pub struct Daemon {
    /// Configuration
    config: Config,
    /// Repositories over the configured backend
    repositories: Arc<BackendRepositories>,
    /// Executable GraphQL schema
    schema: GrocerySchema,
    /// Flipped to `true` to stop the API server gracefully
    shutdown: watch::Sender<bool>,
}

impl Daemon {
    /// Create a daemon over the backend selected by `config.storage`.
    pub async fn from_config(config: Config) -> DaemonResult<Self> {
        let backend = open_backend(&config.storage).await?;
        info!(storage = %config.storage, "Storage backend ready");
        Ok(Self::new(config, backend))
    }

    /// Create a daemon over a provided backend.
    pub fn new(config: Config, backend: Arc<dyn StorageBackend>) -> Self {
        let repositories = Arc::new(BackendRepositories::new(backend));
        let resolvers = Arc::new(Resolvers::new(repositories.clone()));
        let schema = build_schema(resolvers);

        Self {
            config,
            repositories,
            schema,
            shutdown: watch::Sender::new(false),
        }
    }

    /// Repositories the resolvers run against.
    pub fn repositories(&self) -> &Arc<BackendRepositories> {
        &self.repositories
    }

    /// Run the daemon.
    ///
    /// This method blocks until shutdown is requested (SIGINT).
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            "Starting grocery daemon"
        );

        let (api_addr, server) = self.spawn_api_server().await?;
        info!("Running a GraphQL API server at {}/graphql", api_addr);

        tokio::signal::ctrl_c().await?;
        info!("Received shutdown signal");

        self.shutdown();
        if let Err(e) = server.await {
            error!(error = %e, "API server task failed");
        }
        info!("API server stopped");

        Ok(())
    }

    /// Ask the API server to stop accepting connections.
    ///
    /// Requests already in flight run to completion.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// HTTP router serving this daemon's schema.
    pub fn router(&self) -> Router {
        create_router(Arc::new(ApiState {
            schema: self.schema.clone(),
        }))
    }

    /// Start the API server in the background; it runs until [`Daemon::shutdown`].
    pub async fn start_api_server(&self) -> DaemonResult<SocketAddr> {
        let (addr, _server) = self.spawn_api_server().await?;
        Ok(addr)
    }

    async fn spawn_api_server(&self) -> DaemonResult<(SocketAddr, JoinHandle<()>)> {
        let router = self.router();
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);

        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            DaemonError::Config(format!("Failed to bind to {}: {}", addr, e))
        })?;

        let local_addr = listener.local_addr()?;

        let mut stop = self.shutdown.subscribe();
        let shutdown_signal = async move {
            // A dropped sender also ends the wait.
            let _ = stop.wait_for(|stop| *stop).await;
        };

        // Spawn the server task
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal)
                .await
            {
                error!(error = %e, "API server error");
            }
        });

        Ok((local_addr, server))
    }
}

async fn open_backend(storage: &StorageConfig) -> DaemonResult<Arc<dyn StorageBackend>> {
    let backend: Arc<dyn StorageBackend> = match storage {
        StorageConfig::Memory { seed: Some(path) } => {
            Arc::new(MemoryBackend::seeded_from(path).await?)
        },
        StorageConfig::Memory { seed: None } => Arc::new(MemoryBackend::new()),
        StorageConfig::File { path } => Arc::new(JsonFileBackend::open(path.clone()).await?),
    };
    Ok(backend)
}

// =============================================================================
// Tests
// =============================================================================
