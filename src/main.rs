//! `wicket` binary.
//!
//! ```text
//! RUST_LOG=debug wicket 8080 8 --root www --log-file server.log
//! ```

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use wicket::{Cli, Server};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();

    // One OS thread per worker.
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to start runtime: {e}");
            return;
        }
    };

    runtime.block_on(async {
        let server = match Server::bind(config).await {
            Ok(server) => server,
            Err(e) => {
                error!("failed to start server: {e}");
                return;
            }
        };
        if let Err(e) = server.serve().await {
            error!("server error: {e}");
        }
    });
}
