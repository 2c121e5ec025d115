//! Embedded Server Module
//!
//! The seam between the lifecycle and the server it manages, plus the
//! `redis-server` process adapter used in practice.
//!
//! # Contract
//! - `ServerFactory::create(port)` builds an unstarted server
//! - `EmbeddedServer::start` binds and starts it, failing with an I/O error
//! - `EmbeddedServer::stop` is best-effort and never fails

mod redis;

use std::future::Future;
use std::io;

pub use redis::{RedisServer, RedisServerBuilder};

// == Embedded Server ==
/// A server whose lifetime is owned by the host application.
pub trait EmbeddedServer: Send {
    /// Port the server binds to.
    fn port(&self) -> u16;

    /// Starts the server; resolves once it accepts connections.
    fn start(&mut self) -> impl Future<Output = io::Result<()>> + Send;

    /// Stops the server. Failures are logged, not returned.
    fn stop(&mut self) -> impl Future<Output = ()> + Send;
}

// == Server Factory ==
/// Builds an unstarted [`EmbeddedServer`] for a port.
pub trait ServerFactory {
    /// Server type produced by the factory.
    type Server: EmbeddedServer;

    /// Builds an unstarted server bound to `port`.
    fn create(&self, port: u16) -> Self::Server;
}

impl<S, F> ServerFactory for F
where
    S: EmbeddedServer,
    F: Fn(u16) -> S,
{
    type Server = S;

    fn create(&self, port: u16) -> S {
        self(port)
    }
}
