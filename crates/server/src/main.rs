//! Binary entry point for the tailgate log service.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tailgate_logs::{DEFAULT_MAX_LINE_LENGTH, DEFAULT_PAGE_LENGTH, LogsConfigBuilder};
use tailgate_server::{Error, Result, Server, router};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address the HTTP server listens on
    #[arg(long, default_value = "0.0.0.0:3100", env = "TAILGATE_LISTEN_ADDR")]
    listen_addr: SocketAddr,

    /// Directory containing the served log files
    #[arg(long, env = "TAILGATE_LOGS_DIR", required = true)]
    logs_dir: PathBuf,

    /// Bytes read per page when walking a file backwards
    #[arg(long, default_value_t = DEFAULT_PAGE_LENGTH, env = "TAILGATE_PAGE_LENGTH")]
    page_length: usize,

    /// Longest line, in bytes, the service will reassemble
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH, env = "TAILGATE_MAX_LINE_LENGTH")]
    max_line_length: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(Level::INFO).finish(),
    )?;

    let args = Args::parse();

    if args.page_length == 0 || args.max_line_length == 0 {
        return Err(Error::Config(
            "page length and max line length must be positive".to_string(),
        ));
    }
    if !args.logs_dir.is_dir() {
        return Err(Error::Config(format!(
            "{} is not a readable directory",
            args.logs_dir.display()
        )));
    }

    let config = Arc::new(
        LogsConfigBuilder::new(args.logs_dir)
            .page_length(args.page_length)
            .max_line_length(args.max_line_length)
            .build(),
    );

    let server = Server::new(args.listen_addr);
    let _serve_handle = server.start(router(config)).await?;

    wait_for_shutdown().await;

    info!("shutting down");

    server.shutdown().await;

    info!("shutdown complete");

    Ok(())
}

/// Blocks until SIGTERM or SIGINT arrives.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler failed");
        let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT handler failed");

        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
