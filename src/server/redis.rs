//! Redis Server Process
//!
//! Runs a `redis-server` executable as a supervised child process.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{DEFAULT_EXECUTABLE, DEFAULT_PORT};
use crate::server::{EmbeddedServer, ServerFactory};

/// Startup lines printed by redis-server once it accepts connections
const READY_PATTERNS: [&str; 2] = [
    "Ready to accept connections",
    "The server is now ready to accept connections",
];

/// Startup line printed when the port is taken
const ADDR_IN_USE_PATTERN: &str = "Address already in use";

// == Builder ==
/// Configures a [`RedisServer`]. Also acts as a [`ServerFactory`].
#[derive(Debug, Clone)]
pub struct RedisServerBuilder {
    executable: PathBuf,
    args: Vec<OsString>,
    port: u16,
}

impl RedisServerBuilder {
    /// Sets the executable, looked up on `PATH` when relative.
    pub fn executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Appends an argument passed before `--port`, such as a config file.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the port passed as `--port`.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builds an unstarted server.
    pub fn build(self) -> RedisServer {
        RedisServer {
            executable: self.executable,
            args: self.args,
            port: self.port,
            process: None,
            output_task: None,
        }
    }
}

impl Default for RedisServerBuilder {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            args: Vec::new(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerFactory for RedisServerBuilder {
    type Server = RedisServer;

    fn create(&self, port: u16) -> RedisServer {
        self.clone().port(port).build()
    }
}

// == Redis Server ==
/// A `redis-server` child process.
///
/// The process is killed when the server is stopped or dropped.
#[derive(Debug)]
pub struct RedisServer {
    executable: PathBuf,
    args: Vec<OsString>,
    port: u16,
    process: Option<Child>,
    output_task: Option<JoinHandle<()>>,
}

impl RedisServer {
    /// Starts configuring a server with the default executable and port.
    pub fn builder() -> RedisServerBuilder {
        RedisServerBuilder::default()
    }

    /// Creates a server for `port` using the default executable.
    pub fn new(port: u16) -> Self {
        Self::builder().port(port).build()
    }

    /// True while the child process is running.
    pub fn is_active(&self) -> bool {
        self.process.is_some()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .args(&self.args)
            .arg("--port")
            .arg(self.port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        command
    }

    /// Reads startup output until the server reports readiness.
    async fn await_ready(
        &self,
        child: &mut Child,
        lines: &mut Lines<BufReader<ChildStdout>>,
    ) -> io::Result<()> {
        while let Some(line) = lines.next_line().await? {
            debug!(port = self.port, "redis-server: {}", line);

            if READY_PATTERNS.iter().any(|pattern| line.contains(pattern)) {
                return Ok(());
            }
            if line.contains(ADDR_IN_USE_PATTERN) {
                return Err(io::Error::new(io::ErrorKind::AddrInUse, line.trim().to_string()));
            }
        }

        let status = child.wait().await?;
        Err(io::Error::other(format!(
            "{} exited before accepting connections ({})",
            self.executable.display(),
            status
        )))
    }
}

impl EmbeddedServer for RedisServer {
    fn port(&self) -> u16 {
        self.port
    }

    async fn start(&mut self) -> io::Result<()> {
        if self.process.is_some() {
            return Ok(());
        }

        let mut child = self.command().spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("redis-server stdout was not captured"))?;
        let mut lines = BufReader::new(stdout).lines();

        // On error the child is dropped here, which kills it
        self.await_ready(&mut child, &mut lines).await?;

        self.output_task = Some(tokio::spawn(forward_output(lines, self.port)));
        self.process = Some(child);
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(mut child) = self.process.take() {
            if let Err(err) = child.kill().await {
                warn!(port = self.port, error = %err, "Failed to stop redis-server process");
            }
        }
        if let Some(task) = self.output_task.take() {
            task.abort();
        }
    }
}

/// Drains server output after startup so the pipe never fills up.
async fn forward_output(mut lines: Lines<BufReader<ChildStdout>>, port: u16) {
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(port, "redis-server: {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let server = RedisServer::builder().build();
        assert_eq!(server.port(), 6379);
        assert_eq!(server.executable, PathBuf::from("redis-server"));
        assert!(!server.is_active());
    }

    #[test]
    fn test_factory_sets_port() {
        let builder = RedisServer::builder()
            .executable("/opt/redis/bin/redis-server")
            .arg("/etc/redis/redis.conf");
        let server = builder.create(6390);

        assert_eq!(server.port(), 6390);
        assert_eq!(server.args, vec![OsString::from("/etc/redis/redis.conf")]);
        assert_eq!(server.executable, PathBuf::from("/opt/redis/bin/redis-server"));
    }

    #[test]
    fn test_command_arguments() {
        let server = RedisServer::builder().arg("redis.conf").port(6391).build();
        let command = server.command();
        let args: Vec<_> = command.as_std().get_args().collect();
        assert_eq!(args, vec!["redis.conf", "--port", "6391"]);
    }

    #[tokio::test]
    async fn test_start_missing_executable_fails() {
        let mut server = RedisServer::builder()
            .executable("/nonexistent/redis-server")
            .port(6392)
            .build();

        let err = server.start().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!server.is_active());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let mut server = RedisServer::new(6393);
        server.stop().await;
        server.stop().await;
        assert!(!server.is_active());
    }
}
