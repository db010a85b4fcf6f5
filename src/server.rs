//! Listening socket, accept loop and shutdown.
//!
//! # Shutdown
//!
//! On **SIGINT** (Ctrl-C) or, on Unix, **SIGTERM** the server:
//! 1. Stops calling `listener.accept()` and closes the listening socket, so
//!    no new connections are made.
//! 2. Closes the worker pool's queue. Connections already queued or being
//!    handled are allowed to finish.
//! 3. Gives up on any still running after
//!    [`shutdown_grace`](crate::ServerConfig::shutdown_grace), then returns
//!    from [`Server::serve`].
//!
//! A slow or stalled client holds its worker until it finishes; there is no
//! per-connection timeout.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::Permit;
use tracing::{error, info};

use crate::access_log::AccessLog;
use crate::config::ServerConfig;
use crate::connection::{self, Context};
use crate::error::Error;
use crate::pool::WorkerPool;
use crate::sandbox::Sandbox;

type Job = (TcpStream, SocketAddr);

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
    ctx: Arc<Context>,
    workers: usize,
    queue_depth: usize,
    shutdown_grace: Option<Duration>,
}

impl Server {
    /// Prepares the content root and access log, then binds the listening
    /// socket.
    ///
    /// The content root and log file are created if missing. Nothing is
    /// accepted until [`serve`](Server::serve) is called.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use wicket::{Server, ServerConfig};
    ///
    /// # async fn run() -> Result<(), wicket::Error> {
    /// let server = Server::bind(ServerConfig::default()).await?;
    /// server.serve().await
    /// # }
    /// ```
    pub async fn bind(config: ServerConfig) -> Result<Self, Error> {
        tokio::fs::create_dir_all(&config.root).await?;
        let sandbox = Sandbox::new(&config.root, config.index.clone())?;
        let access_log = AccessLog::open(&config.log_file).await?;

        let listener = TcpListener::bind(config.addr()).await?;

        Ok(Self {
            listener,
            ctx: Arc::new(Context { sandbox, access_log }),
            workers: config.workers,
            queue_depth: config.queue_depth(),
            shutdown_grace: config.shutdown_grace,
        })
    }

    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until SIGINT or SIGTERM, then shuts down.
    pub async fn serve(self) -> Result<(), Error> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then shuts down.
    pub async fn serve_with_shutdown<S>(self, signal: S) -> Result<(), Error>
    where
        S: Future<Output = ()>,
    {
        let Self { listener, ctx, workers, queue_depth, shutdown_grace } = self;
        let addr = listener.local_addr()?;

        let pool = WorkerPool::start(workers, queue_depth, move |(stream, peer): Job| {
            let ctx = Arc::clone(&ctx);
            async move { connection::serve(stream, peer, &ctx).await }
        });

        info!(addr = %addr, workers = pool.size(), "wicket listening");

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting even while
                // connections are still arriving.
                biased;

                () = &mut signal => {
                    info!("shutdown signal received");
                    break;
                }

                res = next_connection(&pool, &listener) => match res {
                    Ok((permit, job)) => permit.send(job),
                    Err(Error::PoolClosed) => break,
                    Err(e) => error!("accept error: {e}"),
                },
            }
        }

        drop(listener);
        pool.shutdown(shutdown_grace).await;

        info!("wicket stopped");
        Ok(())
    }
}

/// Waits for room in the worker queue, then for a client.
///
/// Reserving first means that when every worker is busy and the queue is
/// full, clients wait in the kernel's accept backlog.
async fn next_connection<'a>(
    pool: &'a WorkerPool<Job>,
    listener: &TcpListener,
) -> Result<(Permit<'a, Job>, Job), Error> {
    let permit = pool.reserve().await?;
    let job = listener.accept().await?;
    Ok((permit, job))
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// If a handler cannot be installed that signal is simply never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
