// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # REST + WebSocket API
//!
//! Builds the axum router that exposes the vault node's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                   | Description                         |
//! |--------|------------------------|-------------------------------------|
//! | GET    | `/health`              | Liveness probe                      |
//! | GET    | `/status`              | Node status summary                 |
//! | POST   | `/rpc`                 | JSON-RPC 2.0 gateway                |
//! | GET    | `/ws`                  | WebSocket for live vault events     |
//! | GET    | `/vaults/:id`          | Vault state and metadata            |
//! | GET    | `/accounts/:address`   | Account balances                    |
//!
//! ## JSON-RPC Methods
//!
//! All methods take named parameters. State-changing calls carry a `caller`
//! address; owner-restricted ones also name the `cap_id` being presented.
//!
//! | Method                   | Params                                        |
//! |--------------------------|-----------------------------------------------|
//! | `vault_create`           | caller, rate, rate_decimals, name, symbol, description, icon_url? |
//! | `vault_deposit`          | caller, vault_id, cap_id, amount              |
//! | `vault_withdraw`         | caller, vault_id, cap_id, amount              |
//! | `vault_setRate`          | caller, vault_id, cap_id, new_rate            |
//! | `vault_mint`             | caller, vault_id, amount                      |
//! | `vault_redeem`           | caller, vault_id, amount                      |
//! | `vault_transferOwnerCap` | caller, cap_id, recipient                     |
//! | `vault_rate`             | vault_id                                      |
//! | `vault_reserve`          | vault_id                                      |
//! | `vault_isValidOwnerCap`  | vault_id, cap_id                              |
//! | `vault_quote`            | vault_id, direction (mint/redeem), amount     |
//! | `faucet_request`         | address, amount                               |
//! | `account_balances`       | address                                       |
//! | `mintvault_version`      | none                                          |

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use mintvault_contracts::{MetadataFields, VaultSummary};
use mintvault_protocol::object::ObjectId;

use crate::ledger::{AccountBalances, Ledger, LedgerError, QuoteDirection};
use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// The ledger, shared between handlers. Every RPC call takes the lock once
/// and applies atomically.
pub type SharedLedger = Arc<RwLock<Ledger>>;

/// Shared application state available to all request handlers.
///
/// Cheap to clone; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// Network identifier (e.g., "devnet", "testnet", "mainnet").
    pub network: String,
    /// All vaults, caps and accounts.
    pub ledger: SharedLedger,
    /// Broadcast channel for live vault events.
    pub event_tx: broadcast::Sender<VaultEvent>,
    /// Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

/// Events pushed to WebSocket subscribers, one per successful state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VaultEvent {
    VaultCreated {
        vault_id: ObjectId,
        metadata_id: ObjectId,
        owner_cap_id: ObjectId,
        creator: String,
        rate: u64,
        rate_decimals: u8,
        symbol: String,
    },
    Deposited {
        vault_id: ObjectId,
        amount: u64,
        reserve: u64,
    },
    Withdrawn {
        vault_id: ObjectId,
        amount: u64,
        reserve: u64,
    },
    RateUpdated {
        vault_id: ObjectId,
        old_rate: u64,
        new_rate: u64,
    },
    Minted {
        vault_id: ObjectId,
        account: String,
        input: u64,
        output: u64,
    },
    Redeemed {
        vault_id: ObjectId,
        account: String,
        output: u64,
        input: u64,
    },
    OwnerCapTransferred {
        cap_id: ObjectId,
        vault_id: ObjectId,
        from: String,
        to: String,
    },
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/rpc", post(rpc_handler))
        .route("/ws", get(ws_handler))
        .route("/vaults/:id", get(vault_handler))
        .route("/accounts/:address", get(account_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// JSON-RPC Types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version. Must be "2.0".
    pub jsonrpc: String,
    /// The method to invoke.
    pub method: String,
    /// Named method parameters.
    pub params: Option<Value>,
    /// Request identifier. Echoed back in the response.
    pub id: Value,
}

/// A JSON-RPC 2.0 response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version. Always "2.0".
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Request identifier, echoed from the request.
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    /// For vault rejections: `{"kind": ..., "code": ...}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

// -- Parameter shapes --------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreateParams {
    caller: String,
    rate: u64,
    rate_decimals: u8,
    #[serde(flatten)]
    fields: MetadataFields,
}

#[derive(Debug, Deserialize)]
struct OwnerAmountParams {
    caller: String,
    vault_id: ObjectId,
    cap_id: ObjectId,
    amount: u64,
}

#[derive(Debug, Deserialize)]
struct SetRateParams {
    caller: String,
    vault_id: ObjectId,
    cap_id: ObjectId,
    new_rate: u64,
}

#[derive(Debug, Deserialize)]
struct TradeParams {
    caller: String,
    vault_id: ObjectId,
    amount: u64,
}

#[derive(Debug, Deserialize)]
struct TransferCapParams {
    caller: String,
    cap_id: ObjectId,
    recipient: String,
}

#[derive(Debug, Deserialize)]
struct VaultParams {
    vault_id: ObjectId,
}

#[derive(Debug, Deserialize)]
struct CapCheckParams {
    vault_id: ObjectId,
    cap_id: ObjectId,
}

#[derive(Debug, Deserialize)]
struct QuoteParams {
    vault_id: ObjectId,
    direction: QuoteDirection,
    amount: u64,
}

#[derive(Debug, Deserialize)]
struct FaucetParams {
    address: String,
    amount: u64,
}

#[derive(Debug, Deserialize)]
struct AddressParams {
    address: String,
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub network: String,
    /// Vaults held by this node.
    pub vault_count: usize,
    pub faucet_enabled: bool,
    /// Outstanding supply of the reserve asset.
    pub reserve_supply: u64,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Response payload for `GET /vaults/:id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VaultResponse {
    #[serde(flatten)]
    pub summary: VaultSummary,
    pub metadata_id: ObjectId,
    pub metadata: MetadataFields,
    pub owner_cap_id: ObjectId,
    /// Address currently holding the owner capability.
    pub owner: String,
    /// Outstanding supply of the vault's issued asset.
    pub output_supply: u64,
}

/// Generic error body returned by REST endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type RestError = (StatusCode, Json<ErrorResponse>);

fn rest_error(status: StatusCode, error: impl ToString) -> RestError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` -- returns 200 if the node is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// `GET /status` -- returns node status summary.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read();
    Json(StatusResponse {
        version: state.version.clone(),
        network: state.network.clone(),
        vault_count: ledger.vault_count(),
        faucet_enabled: ledger.faucet_enabled(),
        reserve_supply: ledger.reserve_supply(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `GET /vaults/:id` -- vault summary, metadata and ownership.
async fn vault_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VaultResponse>, RestError> {
    let vault_id: ObjectId = id
        .parse()
        .map_err(|e| rest_error(StatusCode::BAD_REQUEST, format!("invalid vault id: {e}")))?;

    let ledger = state.ledger.read();
    let load = || -> Result<VaultResponse, LedgerError> {
        let metadata = ledger.metadata(vault_id)?;
        let owner_cap_id = ledger.owner_cap_of(vault_id)?;
        Ok(VaultResponse {
            summary: ledger.summary(vault_id)?,
            metadata_id: metadata.id(),
            metadata: metadata.fields().clone(),
            owner_cap_id,
            owner: ledger.cap_holder(owner_cap_id)?.to_string(),
            output_supply: ledger.output_supply(vault_id)?,
        })
    };
    load()
        .map(Json)
        .map_err(|e| rest_error(StatusCode::NOT_FOUND, e))
}

/// `GET /accounts/:address` -- balances of one address.
async fn account_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<AccountBalances> {
    Json(state.ledger.read().balances(&address))
}

/// `POST /rpc` -- JSON-RPC 2.0 gateway.
async fn rpc_handler(
    State(state): State<AppState>,
    Json(req): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    if req.jsonrpc != "2.0" {
        return Json(JsonRpcResponse {
            jsonrpc: "2.0".into(),
            result: None,
            error: Some(JsonRpcError::new(
                -32600,
                "Invalid Request: jsonrpc must be \"2.0\"",
            )),
            id: req.id,
        });
    }

    let params = req.params.unwrap_or(Value::Null);
    let (result, error) = match dispatch(&state, &req.method, params) {
        Ok(value) => (Some(value), None),
        Err(err) => {
            tracing::debug!(method = %req.method, code = err.code, message = %err.message, "rpc call failed");
            (None, Some(err))
        }
    };

    Json(JsonRpcResponse {
        jsonrpc: "2.0".into(),
        result,
        error,
        id: req.id,
    })
}

fn parse<P: DeserializeOwned>(params: Value) -> Result<P, JsonRpcError> {
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::new(-32602, format!("Invalid params: {e}")))
}

fn to_result<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::new(-32603, format!("Internal error: {e}")))
}

/// Converts a ledger failure to its RPC error, counting contract rejections.
fn ledger_error(state: &AppState, err: LedgerError) -> JsonRpcError {
    let data = match &err {
        LedgerError::Vault(vault_err) => {
            state.metrics.record_rejection(vault_err.kind());
            Some(json!({ "kind": vault_err.kind(), "code": vault_err.code() }))
        }
        _ => None,
    };
    JsonRpcError {
        code: err.rpc_code(),
        message: err.to_string(),
        data,
    }
}

fn publish(state: &AppState, method: &str, event: VaultEvent) {
    state.metrics.record_success(method);
    // No subscribers is fine.
    let _ = state.event_tx.send(event);
}

/// Routes one method call to the ledger.
fn dispatch(state: &AppState, method: &str, params: Value) -> Result<Value, JsonRpcError> {
    let _timer = state.metrics.operation_latency_seconds.start_timer();
    let fail = |err: LedgerError| ledger_error(state, err);

    match method {
        "vault_create" => {
            let p: CreateParams = parse(params)?;
            let symbol = p.fields.symbol.clone();
            let mut ledger = state.ledger.write();
            let created = ledger
                .create_vault(&p.caller, p.rate, p.rate_decimals, p.fields)
                .map_err(fail)?;

            state.metrics.vaults_created_total.inc();
            state.metrics.live_vaults.set(ledger.vault_count() as i64);
            publish(
                state,
                method,
                VaultEvent::VaultCreated {
                    vault_id: created.vault_id,
                    metadata_id: created.metadata_id,
                    owner_cap_id: created.owner_cap_id,
                    creator: p.caller,
                    rate: p.rate,
                    rate_decimals: p.rate_decimals,
                    symbol,
                },
            );
            to_result(created)
        }
        "vault_deposit" => {
            let p: OwnerAmountParams = parse(params)?;
            let reserve = state
                .ledger
                .write()
                .deposit(&p.caller, p.vault_id, p.cap_id, p.amount)
                .map_err(fail)?;
            publish(
                state,
                method,
                VaultEvent::Deposited {
                    vault_id: p.vault_id,
                    amount: p.amount,
                    reserve,
                },
            );
            Ok(json!({ "reserve": reserve }))
        }
        "vault_withdraw" => {
            let p: OwnerAmountParams = parse(params)?;
            let reserve = state
                .ledger
                .write()
                .withdraw(&p.caller, p.vault_id, p.cap_id, p.amount)
                .map_err(fail)?;
            publish(
                state,
                method,
                VaultEvent::Withdrawn {
                    vault_id: p.vault_id,
                    amount: p.amount,
                    reserve,
                },
            );
            Ok(json!({ "reserve": reserve }))
        }
        "vault_setRate" => {
            let p: SetRateParams = parse(params)?;
            let old_rate = state
                .ledger
                .write()
                .set_rate(&p.caller, p.vault_id, p.cap_id, p.new_rate)
                .map_err(fail)?;
            publish(
                state,
                method,
                VaultEvent::RateUpdated {
                    vault_id: p.vault_id,
                    old_rate,
                    new_rate: p.new_rate,
                },
            );
            Ok(json!({ "old_rate": old_rate, "new_rate": p.new_rate }))
        }
        "vault_mint" => {
            let p: TradeParams = parse(params)?;
            let output = state
                .ledger
                .write()
                .mint(&p.caller, p.vault_id, p.amount)
                .map_err(fail)?;
            publish(
                state,
                method,
                VaultEvent::Minted {
                    vault_id: p.vault_id,
                    account: p.caller,
                    input: p.amount,
                    output,
                },
            );
            Ok(json!({ "input": p.amount, "output": output }))
        }
        "vault_redeem" => {
            let p: TradeParams = parse(params)?;
            let input = state
                .ledger
                .write()
                .redeem(&p.caller, p.vault_id, p.amount)
                .map_err(fail)?;
            publish(
                state,
                method,
                VaultEvent::Redeemed {
                    vault_id: p.vault_id,
                    account: p.caller,
                    output: p.amount,
                    input,
                },
            );
            Ok(json!({ "output": p.amount, "input": input }))
        }
        "vault_transferOwnerCap" => {
            let p: TransferCapParams = parse(params)?;
            let vault_id = state
                .ledger
                .write()
                .transfer_owner_cap(&p.caller, p.cap_id, &p.recipient)
                .map_err(fail)?;
            publish(
                state,
                method,
                VaultEvent::OwnerCapTransferred {
                    cap_id: p.cap_id,
                    vault_id,
                    from: p.caller,
                    to: p.recipient.clone(),
                },
            );
            Ok(json!({ "cap_id": p.cap_id, "vault_id": vault_id, "holder": p.recipient }))
        }
        "vault_rate" => {
            let p: VaultParams = parse(params)?;
            let ledger = state.ledger.read();
            let vault = ledger.vault(p.vault_id).map_err(fail)?;
            Ok(json!({ "rate": vault.rate(), "rate_decimals": vault.rate_decimals() }))
        }
        "vault_reserve" => {
            let p: VaultParams = parse(params)?;
            let ledger = state.ledger.read();
            let vault = ledger.vault(p.vault_id).map_err(fail)?;
            Ok(json!(vault.reserve_value()))
        }
        "vault_isValidOwnerCap" => {
            let p: CapCheckParams = parse(params)?;
            let valid = state
                .ledger
                .read()
                .is_valid_owner_cap(p.vault_id, p.cap_id)
                .map_err(fail)?;
            Ok(json!(valid))
        }
        "vault_quote" => {
            let p: QuoteParams = parse(params)?;
            let quoted = state
                .ledger
                .read()
                .quote(p.vault_id, p.direction, p.amount)
                .map_err(fail)?;
            Ok(json!(quoted))
        }
        "faucet_request" => {
            let p: FaucetParams = parse(params)?;
            let balance = state
                .ledger
                .write()
                .faucet(&p.address, p.amount)
                .map_err(fail)?;
            state.metrics.record_success(method);
            Ok(json!({ "address": p.address, "balance": balance }))
        }
        "account_balances" => {
            let p: AddressParams = parse(params)?;
            to_result(state.ledger.read().balances(&p.address))
        }
        "mintvault_version" => Ok(json!(state.version)),
        _ => Err(JsonRpcError::new(
            -32601,
            format!("Method not found: {method}"),
        )),
    }
}

/// `GET /ws` -- WebSocket upgrade for live event streaming.
///
/// Clients receive JSON-encoded [`VaultEvent`] messages. The connection is
/// push-only; client messages are ignored.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Forwards broadcast events until the client disconnects or the channel
/// closes.
async fn handle_ws_connection(mut socket: WebSocket, state: AppState) {
    let mut rx = state.event_tx.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(ev) => {
                        let payload = match serde_json::to_string(&ev) {
                            Ok(s) => s,
                            Err(e) => {
                                tracing::warn!("failed to serialize ws event: {}", e);
                                continue;
                            }
                        };
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("ws subscriber lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
