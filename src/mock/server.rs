//! HTTP server implementation for the mock server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::common::config::AppConfig;
use crate::mock::inventory::MockInventory;
use crate::mock::Args;
use crate::network::wire::{ClusterSummary, HostSummary, MultipathUpdate, ScsiLunSummary};

pub type SharedInventory = Arc<RwLock<MockInventory>>;

#[derive(Debug, Deserialize)]
pub struct ClusterQuery {
    names: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HostQuery {
    clusters: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LunQuery {
    lun_type: Option<String>,
}

/// Decode `Basic base64(user:pass)`.
pub fn parse_basic_auth(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(AppConfig::SESSION_HEADER)?.to_str().ok()
}

async fn require_session(state: &SharedInventory, headers: &HeaderMap) -> Result<(), StatusCode> {
    let token = session_token(headers).ok_or(StatusCode::UNAUTHORIZED)?;
    if state.read().await.is_valid_session(token) {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn create_session(
    State(state): State<SharedInventory>,
    headers: HeaderMap,
) -> Result<Json<String>, StatusCode> {
    let (user, pass) = parse_basic_auth(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    match state.write().await.login(&user, &pass) {
        Some(token) => {
            tracing::info!(user = %user, "Session created");
            Ok(Json(token))
        }
        None => {
            tracing::warn!(user = %user, "Rejected login");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

async fn delete_session(State(state): State<SharedInventory>, headers: HeaderMap) -> StatusCode {
    let Some(token) = session_token(&headers) else {
        return StatusCode::UNAUTHORIZED;
    };
    if state.write().await.logout(token) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn list_clusters(
    State(state): State<SharedInventory>,
    headers: HeaderMap,
    Query(query): Query<ClusterQuery>,
) -> Result<Json<Vec<ClusterSummary>>, StatusCode> {
    require_session(&state, &headers).await?;
    Ok(Json(state.read().await.clusters_named(query.names.as_deref())))
}

async fn list_hosts(
    State(state): State<SharedInventory>,
    headers: HeaderMap,
    Query(query): Query<HostQuery>,
) -> Result<Json<Vec<HostSummary>>, StatusCode> {
    require_session(&state, &headers).await?;
    Ok(Json(state.read().await.hosts_in(query.clusters.as_deref())))
}

async fn list_luns(
    State(state): State<SharedInventory>,
    headers: HeaderMap,
    Path(host_id): Path<String>,
    Query(query): Query<LunQuery>,
) -> Result<Json<Vec<ScsiLunSummary>>, StatusCode> {
    require_session(&state, &headers).await?;
    let inventory = state.read().await;
    let host = inventory.host(&host_id).ok_or(StatusCode::NOT_FOUND)?;
    // An unhealthy host cannot answer storage queries.
    if !host.is_healthy() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    inventory
        .luns_of(&host_id, query.lun_type.as_deref())
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_multipath(
    State(state): State<SharedInventory>,
    headers: HeaderMap,
    Path((host_id, canonical_name)): Path<(String, String)>,
    Json(update): Json<MultipathUpdate>,
) -> Result<Json<ScsiLunSummary>, StatusCode> {
    require_session(&state, &headers).await?;
    if !update.policy.is_round_robin() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut inventory = state.write().await;
    match inventory.update_multipath(
        &host_id,
        &canonical_name,
        update.policy,
        update.commands_per_path,
    ) {
        Ok(lun) => {
            tracing::info!(
                host = %host_id,
                lun = %canonical_name,
                commands_per_path = update.commands_per_path,
                "Multipath updated"
            );
            Ok(Json(lun))
        }
        Err(true) => Err(StatusCode::NOT_FOUND),
        Err(false) => {
            tracing::warn!(host = %host_id, lun = %canonical_name, "Simulated update failure");
            Err(StatusCode::CONFLICT)
        }
    }
}

pub fn router(state: SharedInventory) -> Router {
    Router::new()
        .route("/api/session", post(create_session).delete(delete_session))
        .route("/api/vcenter/cluster", get(list_clusters))
        .route("/api/vcenter/host", get(list_hosts))
        .route("/api/vcenter/host/{host}/storage/scsi-luns", get(list_luns))
        .route(
            "/api/vcenter/host/{host}/storage/scsi-luns/{lun}/multipath",
            patch(update_multipath),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the simulated cluster until the process is stopped.
pub async fn start_server(args: Args) -> Result<()> {
    let inventory = MockInventory::generate(&args);
    let healthy = inventory.hosts.iter().filter(|h| h.is_healthy()).count();
    let state = Arc::new(RwLock::new(inventory));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = TcpListener::bind(addr).await?;
    println!("Listening on http://{addr}");
    println!(
        "Cluster '{}': {healthy} healthy host(s), {} unhealthy, {} disk LUN(s) per host",
        args.cluster, args.unhealthy_hosts, args.luns_per_host
    );
    println!("Login: {} / {}", args.username, args.password);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
