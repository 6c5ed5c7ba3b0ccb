// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CLI Interface
//!
//! Command-line arguments for `mintvault-node`, via `clap` derive. Every
//! `run` flag has an environment-variable fallback.

use clap::{Parser, Subcommand};

use mintvault_protocol::config::{DEFAULT_METRICS_PORT, DEFAULT_RPC_PORT, NETWORK_DEVNET};

use crate::ledger::QuoteDirection;
use crate::logging::LogFormat;

/// Mintvault fixed-rate vault node.
///
/// Hosts vaults in memory, serves the JSON-RPC and REST API, streams vault
/// events over WebSocket, and exposes Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "mintvault-node",
    about = "Mintvault fixed-rate vault node",
    version,
    propagate_version = true
)]
pub struct MintvaultNodeCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the node.
    Run(RunArgs),
    /// Convert an amount at a rate, offline.
    Quote(QuoteArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Port for the JSON-RPC and REST API.
    #[arg(long, env = "MINTVAULT_RPC_PORT", default_value_t = DEFAULT_RPC_PORT)]
    pub rpc_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "MINTVAULT_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Network to run: mainnet, testnet, or devnet.
    #[arg(long, env = "MINTVAULT_NETWORK", default_value = NETWORK_DEVNET)]
    pub network: String,

    /// Log output format.
    #[arg(long, env = "MINTVAULT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Serve the reserve-asset faucet. Always off on mainnet.
    #[arg(
        long,
        env = "MINTVAULT_FAUCET",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub faucet: bool,
}

/// Arguments for the `quote` subcommand.
#[derive(Parser, Debug)]
pub struct QuoteArgs {
    /// Raw rate. Must be non-zero.
    #[arg(long)]
    pub rate: u64,

    /// Rate precision exponent.
    #[arg(long, default_value_t = 9)]
    pub decimals: u8,

    /// Amount to convert, in smallest units.
    pub amount: u64,

    #[arg(long, value_enum, default_value_t = QuoteDirection::Mint)]
    pub direction: QuoteDirection,
}
