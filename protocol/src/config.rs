// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Protocol Configuration & Constants
//!
//! Every magic number in Mintvault lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! Runtime knobs (ports, network name, log format) are parsed by the node's
//! CLI layer; the values below are the defaults it falls back to.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The full protocol version string.
///
/// Bumped whenever the conversion semantics or the error code table change.
/// Clients pinning behavior against a deployment should compare this.
pub const PROTOCOL_VERSION: &str = "0.1.0";

/// Major version. A bump here means existing quotes may no longer reproduce.
pub const PROTOCOL_VERSION_MAJOR: u16 = 0;

/// Minor version. Backward-compatible additions only.
pub const PROTOCOL_VERSION_MINOR: u16 = 1;

/// Patch version. Non-semantic fixes.
pub const PROTOCOL_VERSION_PATCH: u16 = 0;

// ---------------------------------------------------------------------------
// Conversion Parameters
// ---------------------------------------------------------------------------

/// Largest precision exponent a vault rate may carry.
///
/// `10^19` is the largest power of ten that fits in a `u64`
/// (`u64::MAX` is roughly `1.8 * 10^19`). One more and the divisor itself
/// overflows.
pub const MAX_RATE_DECIMALS: u8 = 19;

/// Decimal places used when rendering a rate for humans (`rate / 10^d`).
///
/// Display only. The ledger never converts through floating point.
pub const DISPLAY_RATE_DECIMALS: usize = 9;

// ---------------------------------------------------------------------------
// Node Defaults
// ---------------------------------------------------------------------------

/// Default JSON-RPC / REST port.
pub const DEFAULT_RPC_PORT: u16 = 9841;

/// Default Prometheus metrics port.
pub const DEFAULT_METRICS_PORT: u16 = 9842;

/// Broadcast channel capacity for live vault events.
/// Large enough to absorb short bursts without dropping events for
/// connected WebSocket clients.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Maximum amount of reserve asset a single faucet request may mint.
///
/// The faucet exists so devnet users can fund accounts; it should never be
/// the reason someone ends up holding a meaningful share of supply.
pub const MAX_FAUCET_AMOUNT: u64 = 1_000_000_000_000;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str =
    "mintvault_node=info,mintvault_contracts=info,mintvault_protocol=info,tower_http=debug";

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// Network names accepted by the node.
pub const NETWORK_MAINNET: &str = "mainnet";
pub const NETWORK_TESTNET: &str = "testnet";
pub const NETWORK_DEVNET: &str = "devnet";

/// Returns `true` for a network name the node knows how to run.
pub fn is_known_network(name: &str) -> bool {
    matches!(name, NETWORK_MAINNET | NETWORK_TESTNET | NETWORK_DEVNET)
}

/// Whether the faucet may be enabled on the given network.
/// Free money on mainnet is a bug, not a feature.
pub fn faucet_allowed(network: &str) -> bool {
    network != NETWORK_MAINNET
}
