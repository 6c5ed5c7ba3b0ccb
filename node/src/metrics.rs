// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Prometheus Metrics
//!
//! Operational metrics for the vault node, scraped at `/metrics` on the
//! configured metrics port.
//!
//! All metrics live in a dedicated [`prometheus::Registry`] with the
//! `mintvault` namespace, so they do not collide with any default global
//! registry consumers.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Holds all Prometheus metric handles for the node.
///
/// Prometheus handles are `Arc`s internally, so clones share state.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Vaults created since startup.
    pub vaults_created_total: IntCounter,
    /// Vaults currently held by the ledger.
    pub live_vaults: IntGauge,
    /// Successful state-changing operations, by operation name.
    pub operations_total: IntCounterVec,
    /// Operations the vault rejected, by error kind.
    pub rejected_operations_total: IntCounterVec,
    /// Time spent inside the ledger per RPC call.
    pub operation_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("mintvault".into()), None)?;

        let vaults_created_total =
            IntCounter::new("vaults_created_total", "Total number of vaults created")?;
        registry.register(Box::new(vaults_created_total.clone()))?;

        let live_vaults = IntGauge::new("live_vaults", "Number of vaults held by this node")?;
        registry.register(Box::new(live_vaults.clone()))?;

        let operations_total = IntCounterVec::new(
            Opts::new(
                "operations_total",
                "Successful vault operations, by operation",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let rejected_operations_total = IntCounterVec::new(
            Opts::new(
                "rejected_operations_total",
                "Vault operations rejected by the contract, by error kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(rejected_operations_total.clone()))?;

        let operation_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "operation_latency_seconds",
                "Time spent applying one RPC call to the ledger, in seconds",
            )
            .buckets(vec![
                0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1,
            ]),
        )?;
        registry.register(Box::new(operation_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            vaults_created_total,
            live_vaults,
            operations_total,
            rejected_operations_total,
            operation_latency_seconds,
        })
    }

    /// Counts one successful operation.
    pub fn record_success(&self, operation: &str) {
        self.operations_total.with_label_values(&[operation]).inc();
    }

    /// Counts one contract rejection.
    pub fn record_rejection(&self, kind: &str) {
        self.rejected_operations_total.with_label_values(&[kind]).inc();
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
