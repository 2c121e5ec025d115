//! Embedded Redis - Lifecycle management for a local Redis server
//!
//! Starts a `redis-server` alongside the host application in non-production
//! environments and stops it on shutdown, driven by configuration properties.

#![warn(missing_docs)]

pub mod activation;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod server;

pub use activation::is_activated;
pub use config::{Properties, RedisSettings};
pub use error::LifecycleError;
pub use lifecycle::{EmbeddedRedisLifecycle, LifecycleState};
pub use server::{EmbeddedServer, RedisServer, ServerFactory};
