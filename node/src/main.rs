// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Mintvault Node
//!
//! Entry point for the `mintvault-node` binary. Parses CLI arguments,
//! initializes logging and metrics, and serves the HTTP/WS API over an
//! in-memory vault ledger.
//!
//! The binary supports three subcommands:
//!
//! - `run`     -- start the node
//! - `quote`   -- convert an amount at a rate without starting anything
//! - `version` -- print build version information

mod api;
mod cli;
mod ledger;
mod logging;
mod metrics;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use parking_lot::RwLock;
use tokio::signal;
use tokio::sync::broadcast;

use mintvault_protocol::config::{
    faucet_allowed, is_known_network, DEFAULT_LOG_FILTER, EVENT_CHANNEL_CAPACITY, MAX_RATE_DECIMALS,
    PROTOCOL_VERSION,
};
use mintvault_protocol::math::{compute_input, compute_output, format_rate};

use cli::{Commands, MintvaultNodeCli};
use ledger::{Ledger, QuoteDirection};
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = MintvaultNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Quote(args) => quote(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the node: API server and metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(DEFAULT_LOG_FILTER, args.log_format);

    if !is_known_network(&args.network) {
        bail!("unknown network: {}", args.network);
    }
    let faucet_enabled = args.faucet && faucet_allowed(&args.network);
    if args.faucet && !faucet_enabled {
        tracing::warn!(network = %args.network, "faucet requested but not allowed on this network");
    }

    tracing::info!(
        rpc_port = args.rpc_port,
        metrics_port = args.metrics_port,
        network = %args.network,
        faucet_enabled,
        "starting mintvault-node"
    );

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to create metrics registry")?);

    // --- Event broadcast ---
    let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            PROTOCOL_VERSION,
        ),
        network: args.network.clone(),
        ledger: Arc::new(RwLock::new(Ledger::new(faucet_enabled))),
        event_tx,
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.rpc_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind RPC listener on {}", api_addr))?;
    tracing::info!("RPC/API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("mintvault-node stopped");
    Ok(())
}

/// Prints the conversion of `amount` at the given rate.
fn quote(args: cli::QuoteArgs) -> Result<()> {
    if args.decimals > MAX_RATE_DECIMALS {
        bail!("decimals must be at most {MAX_RATE_DECIMALS}");
    }

    let converted = match args.direction {
        QuoteDirection::Mint => compute_output(args.rate, args.amount, args.decimals),
        QuoteDirection::Redeem => compute_input(args.rate, args.amount, args.decimals),
    }
    .with_context(|| format!("cannot convert {} at rate {}", args.amount, args.rate))?;

    println!("rate      {}", format_rate(args.rate, args.decimals, usize::from(MAX_RATE_DECIMALS)));
    println!("direction {:?}", args.direction);
    println!("input     {}", args.amount);
    println!("output    {}", converted);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("mintvault-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol       {}", PROTOCOL_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. A handler that fails to
/// install is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
