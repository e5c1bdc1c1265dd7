//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use regex::Regex;
use serde_json::Value;

use crate::cache::{SharedCache, StatsSnapshot};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, EntriesResponse, ExtendRequest, GetResponse, HealthResponse, KeysRequest,
    KeysResponse, MessageResponse, MsetRequest, PatternQuery, RemovedResponse, SetRequest,
    SetResponse, StoredResponse, TtlResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide cache of JSON values
    pub cache: SharedCache<Value>,
}

impl AppState {
    pub fn new(cache: SharedCache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(SharedCache::new(config.cache_config()))
    }
}

fn compile_pattern(query: &PatternQuery) -> Result<Regex> {
    let pattern = query
        .pattern
        .as_deref()
        .ok_or_else(|| CacheError::InvalidRequest("Missing 'pattern' parameter".to_string()))?;
    Ok(Regex::new(pattern)?)
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    state.cache.set(req.key.clone(), req.value, ttl).await;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Value and TTL under one lock so they describe the same entry
    let mut cache = state.cache.lock().await;
    let value = cache
        .get(&key)
        .cloned()
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;
    let ttl_ms = cache.ttl(&key);

    Ok(Json(GetResponse::new(key, value, ttl_ms)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key).await {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /ttl/:key
pub async fn ttl_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<TtlResponse> {
    let ttl_ms = state.cache.ttl(&key).await;
    Json(TtlResponse { key, ttl_ms })
}

/// Handler for POST /extend/:key
pub async fn extend_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<ExtendRequest>,
) -> Result<Json<TtlResponse>> {
    let mut cache = state.cache.lock().await;
    if !cache.extend(&key, Duration::from_millis(req.additional_ms)) {
        return Err(CacheError::NotFound(key));
    }
    let ttl_ms = cache.ttl(&key);

    Ok(Json(TtlResponse { key, ttl_ms }))
}

/// Handler for GET /keys
///
/// Lists live keys, optionally filtered by `?pattern=`. Listing does not
/// count as a read.
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<KeysResponse>> {
    let mut keys = state.cache.keys().await;
    if query.pattern.is_some() {
        let pattern = compile_pattern(&query)?;
        keys.retain(|key| pattern.is_match(key));
    }
    keys.sort();

    Ok(Json(KeysResponse { keys }))
}

/// Handler for POST /mget
pub async fn mget_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Json<EntriesResponse> {
    let entries = state.cache.get_many(&req.keys).await;
    Json(EntriesResponse { entries })
}

/// Handler for PUT /mset
pub async fn mset_handler(
    State(state): State<AppState>,
    Json(req): Json<MsetRequest>,
) -> Result<Json<StoredResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let count = req.entries.len();
    let entries = req.entries.into_iter().map(|entry| {
        let ttl = entry.ttl();
        (entry.key, entry.value, ttl)
    });
    state.cache.set_many(entries).await;

    Ok(Json(StoredResponse { count }))
}

/// Handler for POST /mdel
pub async fn mdel_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Json<RemovedResponse> {
    let removed = state.cache.delete_many(&req.keys).await;
    Json(RemovedResponse { removed })
}

/// Handler for GET /match
pub async fn match_get_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<EntriesResponse>> {
    let pattern = compile_pattern(&query)?;
    let entries = state.cache.get_pattern(&pattern).await;

    Ok(Json(EntriesResponse { entries }))
}

/// Handler for DELETE /match
pub async fn match_delete_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<RemovedResponse>> {
    let pattern = compile_pattern(&query)?;
    let removed = state.cache.delete_pattern(&pattern).await;

    Ok(Json(RemovedResponse { removed }))
}

/// Handler for POST /prune
pub async fn prune_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.cache.prune().await;
    Json(RemovedResponse { removed })
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.clear().await;
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.cache.stats().await)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
