use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use csvtidy_core::CleanRequest;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::load_config;
use crate::routes::router;
use crate::state::AppState;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on [default: $CSVTIDY_BIND or 127.0.0.1:5000]
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    /// Defaults for uploads that send no options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

fn bind_address(flag: Option<SocketAddr>) -> Result<SocketAddr> {
    if let Some(addr) = flag {
        return Ok(addr);
    }
    let raw = std::env::var("CSVTIDY_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    raw.parse()
        .with_context(|| format!("CSVTIDY_BIND must be a socket address, got '{raw}'"))
}

pub async fn handle_serve_command(args: ServeArgs) -> Result<()> {
    dotenvy::dotenv().ok();
    let addr = bind_address(args.bind)?;
    let defaults = match &args.config {
        Some(path) => load_config(path)?,
        None => CleanRequest::default(),
    };

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(AppState::new(defaults)))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down");
        })
        .await?;
    Ok(())
}
