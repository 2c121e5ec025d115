//! Embedded Server Lifecycle
//!
//! Starts the embedded server when configuration enables it and stops it on
//! shutdown.
//!
//! # State Machine
//! - `Stopped` (initial) -> `Running` on a successful `start()` when enabled
//! - `Stopped` -> `Stopped` on `start()` when disabled
//! - `Running` -> `Stopped` on `stop()`

use tracing::{debug, info, warn};

use crate::config::{Properties, RedisSettings};
use crate::error::{LifecycleError, Result};
use crate::server::{EmbeddedServer, RedisServer, RedisServerBuilder, ServerFactory};

// == Lifecycle State ==
/// Whether the embedded server is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No server handle is held
    Stopped,
    /// The server started successfully and has not been stopped
    Running,
}

// == Lifecycle Manager ==
/// Owns the embedded server for the lifetime of the host application.
///
/// Settings are resolved once at construction and never change afterwards.
/// The server handle is present only between a successful `start()` and the
/// following `stop()`.
pub struct EmbeddedRedisLifecycle<F: ServerFactory = RedisServerBuilder> {
    settings: RedisSettings,
    factory: F,
    server: Option<F::Server>,
}

impl EmbeddedRedisLifecycle<RedisServerBuilder> {
    /// Creates a lifecycle that runs the configured `redis-server` binary.
    pub fn new(properties: &Properties) -> Self {
        let settings = RedisSettings::resolve(properties);
        let factory = RedisServer::builder().executable(settings.executable.clone());
        Self::from_settings(settings, factory)
    }
}

impl<F: ServerFactory> EmbeddedRedisLifecycle<F> {
    /// Creates a lifecycle that builds its server through `factory`.
    pub fn with_factory(properties: &Properties, factory: F) -> Self {
        Self::from_settings(RedisSettings::resolve(properties), factory)
    }

    /// Creates a lifecycle from an already resolved settings snapshot.
    pub fn from_settings(settings: RedisSettings, factory: F) -> Self {
        Self {
            settings,
            factory,
            server: None,
        }
    }

    // == Configuration ==
    /// Settings snapshot taken at construction.
    pub fn settings(&self) -> &RedisSettings {
        &self.settings
    }

    /// Port the embedded server binds to.
    pub fn resolve_port(&self) -> u16 {
        self.settings.port
    }

    /// Whether configuration asks for an embedded server.
    pub fn is_embedded_enabled(&self) -> bool {
        self.settings.embedded
    }

    // == State ==
    /// True between a successful `start()` and the next `stop()`.
    pub fn is_running(&self) -> bool {
        self.server.is_some()
    }

    /// Current position in the `Stopped`/`Running` state machine.
    pub fn state(&self) -> LifecycleState {
        if self.is_running() {
            LifecycleState::Running
        } else {
            LifecycleState::Stopped
        }
    }

    /// The running server, if any.
    pub fn server(&self) -> Option<&F::Server> {
        self.server.as_ref()
    }

    // == Start ==
    /// Starts the embedded server if it is enabled.
    ///
    /// Does nothing when disabled. A failure to start is fatal for the host
    /// and is returned as [`LifecycleError::StartupFailure`].
    pub async fn start(&mut self) -> Result<()> {
        if !self.is_embedded_enabled() {
            debug!("Embedded redis server disabled, skipping startup");
            return Ok(());
        }
        if self.is_running() {
            warn!(
                port = self.resolve_port(),
                "Embedded redis server already running, ignoring start"
            );
            return Ok(());
        }

        let port = self.resolve_port();
        let mut server = self.factory.create(port);
        server
            .start()
            .await
            .map_err(|source| LifecycleError::StartupFailure { port, source })?;

        self.server = Some(server);
        info!(port, "Started local embedded redis server on port {}", port);
        Ok(())
    }

    // == Stop ==
    /// Stops the embedded server if it is running. Safe to call repeatedly.
    pub async fn stop(&mut self) {
        if let Some(mut server) = self.server.take() {
            let port = server.port();
            server.stop().await;
            info!(port, "Stopped local embedded redis server");
        }
    }
}
