//! Server configuration and command-line arguments.
//!
//! ```text
//! wicket [PORT] [THREADS] [--host ADDR] [--root DIR] [--index NAME]
//!        [--log-file PATH] [--queue-depth N] [--shutdown-grace SECS]
//! ```
//!
//! `PORT` and `THREADS` are forgiving: a missing or unparseable value falls
//! back to the default with a warning instead of refusing to start.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_ROOT: &str = "www";
pub const DEFAULT_INDEX: &str = "index.html";
pub const DEFAULT_LOG_FILE: &str = "server.log";
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Everything [`Server::bind`](crate::Server::bind) needs.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Number of connections handled concurrently.
    pub workers: usize,
    /// Accepted connections allowed to wait for a worker. `None` means one
    /// slot per worker.
    pub queue_depth: Option<usize>,
    /// Directory served as `/`.
    pub root: PathBuf,
    /// Document served for a request to `/`.
    pub index: String,
    pub log_file: PathBuf,
    /// How long shutdown waits for in-flight connections. `None` waits
    /// indefinitely.
    pub shutdown_grace: Option<Duration>,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn queue_depth(&self) -> usize {
        self.queue_depth.unwrap_or(self.workers).max(1)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            queue_depth: None,
            root: PathBuf::from(DEFAULT_ROOT),
            index: DEFAULT_INDEX.to_owned(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            shutdown_grace: Some(DEFAULT_SHUTDOWN_GRACE),
        }
    }
}

/// Command-line arguments for the `wicket` binary.
#[derive(Debug, Parser)]
#[command(name = "wicket", version, about = "Serve a directory over HTTP/1.1")]
pub struct Cli {
    /// Port to listen on [default: 8080]
    #[arg(allow_negative_numbers = true)]
    pub port: Option<String>,

    /// Number of worker threads [default: 8]
    #[arg(allow_negative_numbers = true)]
    pub threads: Option<String>,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Directory to serve, created if missing
    #[arg(long, default_value = DEFAULT_ROOT)]
    pub root: PathBuf,

    /// Document served for `/`
    #[arg(long, default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Access log file, created if missing
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Connections allowed to wait for a free worker [default: THREADS]
    #[arg(long)]
    pub queue_depth: Option<usize>,

    /// Seconds to wait for in-flight connections on shutdown; 0 waits forever
    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_GRACE.as_secs())]
    pub shutdown_grace: u64,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        let port = lenient(self.port.as_deref(), "port", DEFAULT_PORT, |_| true);
        let workers = lenient(self.threads.as_deref(), "threads", DEFAULT_WORKERS, |&n| n > 0);

        ServerConfig {
            host: self.host,
            port,
            workers,
            queue_depth: self.queue_depth.filter(|&n| n > 0),
            root: self.root,
            index: self.index,
            log_file: self.log_file,
            shutdown_grace: (self.shutdown_grace > 0).then(|| Duration::from_secs(self.shutdown_grace)),
        }
    }
}

fn lenient<T>(raw: Option<&str>, name: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    let Some(raw) = raw else { return default };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            warn!(value = raw, "invalid {name}, using default {default}");
            default
        }
    }
}
