//! # HTTP API
//!
//! JSON API over one wardrobe database, served with axum.
//!
//! All requests share a single `Wardrobe` behind a `tokio::sync::Mutex`, so
//! operations never interleave. Mutating routes persist the wardrobe before
//! answering when the file backend is in use; a failed save puts the
//! in-memory catalog back to its state before the request.
//!
//! When an API key is configured, every route except `/health` requires it,
//! either as `Authorization: Bearer <key>` or as an `x-api-key` header.

use crate::cli::{
    CliError, CliWardrobe, LOCAL_USER, TRENDING_TOPICS, parse_feed_order, save_wardrobe,
};
use crate::config::ServerConfig;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dadaplace_core::{
    ClothingGap, ClothingItem, Comment, CommentId, CommunityPost, DadaError, ItemId, ItemQuery,
    LookId, Occasion, OutfitLook, OutfitRequest, OutfitScore, PostId, StoreBackend, TaggedItem,
    UserProfile, WardrobeStats,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

// =============================================================================
// ERRORS
// =============================================================================

pub type ApiResult<T> = Result<T, ApiError>;

/// API error with HTTP status code.
#[derive(Debug, Clone, Serialize, Error)]
#[error("[{status}] {message}")]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    pub fn with_code(status: StatusCode, message: impl Into<String>, code: &str) -> Self {
        Self {
            status,
            message: message.into(),
            code: Some(code.to_string()),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, message, "INVALID_ARGUMENT")
    }

    /// 401 Unauthorized
    pub fn unauthorized() -> Self {
        Self::with_code(StatusCode::UNAUTHORIZED, "missing or invalid API key", "UNAUTHORIZED")
    }

    /// 429 Too Many Requests
    pub fn rate_limited() -> Self {
        Self::with_code(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded", "RATE_LIMITED")
    }

    /// 404 Not Found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::with_code(
            StatusCode::NOT_FOUND,
            format!("not found: {}", resource.into()),
            "NOT_FOUND",
        )
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }
}

impl From<DadaError> for ApiError {
    fn from(err: DadaError) -> Self {
        match err {
            DadaError::InvalidArgument(message) => Self::bad_request(message),
            DadaError::NotFound { kind, id } => Self::not_found(format!("{kind} {id}")),
            other => {
                error!(error = %other, "request failed");
                Self::internal(other.to_string())
            }
        }
    }
}

impl From<CliError> for ApiError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(core) => core.into(),
            CliError::NotFound(message) => Self::not_found(message),
            CliError::InvalidInput(message) => Self::bad_request(message),
            other => {
                error!(error = %other, "request failed");
                Self::internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.message,
            "code": self.code,
        }));
        (self.status, body).into_response()
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Shared state of the HTTP server.
#[derive(Clone)]
pub struct AppState {
    wardrobe: Arc<Mutex<CliWardrobe>>,
    /// Snapshot path for the file backend; `None` keeps changes in memory.
    db_path: Option<Arc<PathBuf>>,
    api_key: Option<Arc<str>>,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl AppState {
    pub fn new(wardrobe: CliWardrobe, db_path: Option<PathBuf>, api_key: Option<String>) -> Self {
        Self {
            wardrobe: Arc::new(Mutex::new(wardrobe)),
            db_path: db_path.map(Arc::new),
            api_key: api_key.map(Arc::from),
            limiter: None,
        }
    }

    /// Cap requests per second across all clients. Zero leaves them uncapped.
    #[must_use]
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        self.limiter = NonZeroU32::new(per_second)
            .map(|n| Arc::new(RateLimiter::direct(Quota::per_second(n))));
        self
    }

    async fn lock(&self) -> MutexGuard<'_, CliWardrobe> {
        self.wardrobe.lock().await
    }

    /// Apply `change` and save the result. When either step fails the
    /// file-backed catalog is restored to what it was before.
    fn commit<T>(
        &self,
        wardrobe: &mut CliWardrobe,
        change: impl FnOnce(&mut CliWardrobe) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let Some(path) = &self.db_path else {
            return change(wardrobe);
        };
        let before = wardrobe.store().as_memory().cloned();
        let result = match change(wardrobe) {
            Ok(value) => save_wardrobe(wardrobe, path)
                .map(|()| value)
                .map_err(ApiError::from),
            Err(err) => Err(err),
        };
        if result.is_err()
            && let Some(before) = before
        {
            warn!(path = %path.display(), "change not saved, rolling back");
            *wardrobe.store_mut() = StoreBackend::Memory(before);
        }
        result
    }
}

// =============================================================================
// AUTH
// =============================================================================

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(value);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Compare keys without leaking the position of the first mismatch.
fn key_matches(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.api_key {
        let authorized = presented_key(request.headers())
            .is_some_and(|presented| key_matches(expected, presented));
        if !authorized {
            warn!(path = %request.uri().path(), "rejected request without valid API key");
            return Err(ApiError::unauthorized());
        }
    }
    Ok(next.run(request).await)
}

async fn limit_rate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(limiter) = &state.limiter
        && limiter.check().is_err()
    {
        warn!(path = %request.uri().path(), "rate limit exceeded");
        return Err(ApiError::rate_limited());
    }
    Ok(next.run(request).await)
}

// =============================================================================
// REQUEST / RESPONSE BODIES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub item_ids: Vec<ItemId>,
    pub temperature: i32,
    pub occasion: Occasion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: OutfitScore,
    pub overall: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedParams {
    /// `latest`, `mixed` (default) or `following`.
    pub order: Option<String>,
    /// Comma-separated user ids for `following`.
    pub follow: Option<String>,
    /// Search text; overrides the ordering.
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<CommunityPost>,
    pub trending: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPost {
    pub content: String,
    pub topics: Vec<String>,
    pub image_uris: Vec<String>,
    pub outfit_look_id: Option<LookId>,
    pub tagged_items: Vec<TaggedItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewComment {
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn status(State(state): State<AppState>) -> ApiResult<Json<WardrobeStats>> {
    Ok(Json(state.lock().await.stats()?))
}

async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Json<Vec<ClothingItem>>> {
    Ok(Json(state.lock().await.find_items(&query)?))
}

async fn create_item(
    State(state): State<AppState>,
    Json(item): Json<ClothingItem>,
) -> ApiResult<(StatusCode, Json<ClothingItem>)> {
    let mut wardrobe = state.lock().await;
    let item = state.commit(&mut wardrobe, |w| Ok(w.add_item(item)?))?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<ClothingItem>> {
    state
        .lock()
        .await
        .get_item(ItemId(id))?
        .map(Json)
        .ok_or_else(|| DadaError::not_found("item", id).into())
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(mut item): Json<ClothingItem>,
) -> ApiResult<Json<ClothingItem>> {
    item.id = ItemId(id);
    let mut wardrobe = state.lock().await;
    let updated = state.commit(&mut wardrobe, |w| {
        w.update_item(item)?
            .ok_or_else(|| DadaError::not_found("item", id).into())
    })?;
    Ok(Json(updated))
}

async fn delete_item(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<StatusCode> {
    let mut wardrobe = state.lock().await;
    state.commit(&mut wardrobe, |w| found(w.delete_item(ItemId(id))?, "item", id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<ClothingItem>> {
    let mut wardrobe = state.lock().await;
    state.commit(&mut wardrobe, |w| found(w.toggle_favorite(ItemId(id))?, "item", id))?;
    wardrobe
        .get_item(ItemId(id))?
        .map(Json)
        .ok_or_else(|| DadaError::not_found("item", id).into())
}

async fn mark_worn(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<ClothingItem>> {
    let mut wardrobe = state.lock().await;
    state.commit(&mut wardrobe, |w| {
        found(w.increment_worn_count(ItemId(id))?, "item", id)
    })?;
    wardrobe
        .get_item(ItemId(id))?
        .map(Json)
        .ok_or_else(|| DadaError::not_found("item", id).into())
}

async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<OutfitRequest>,
) -> ApiResult<Json<Vec<OutfitLook>>> {
    Ok(Json(state.lock().await.recommend(&request)?))
}

async fn recommend_from(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<OutfitRequest>,
) -> ApiResult<Json<Vec<OutfitLook>>> {
    let wardrobe = state.lock().await;
    let looks = wardrobe
        .engine()
        .generate_from_starting_item(ItemId(id), &request)?;
    Ok(Json(looks))
}

async fn gaps(
    State(state): State<AppState>,
    Json(request): Json<OutfitRequest>,
) -> ApiResult<Json<Vec<ClothingGap>>> {
    Ok(Json(state.lock().await.analyze_gaps(&request)?))
}

async fn score(
    State(state): State<AppState>,
    Json(body): Json<ScoreRequest>,
) -> ApiResult<Json<ScoreResponse>> {
    if body.item_ids.is_empty() {
        return Err(ApiError::bad_request("no items to score"));
    }
    let wardrobe = state.lock().await;
    let mut items = Vec::with_capacity(body.item_ids.len());
    for id in &body.item_ids {
        let item = wardrobe
            .get_item(*id)?
            .ok_or_else(|| DadaError::not_found("item", id.0))?;
        items.push(item);
    }
    let request = OutfitRequest::new(body.temperature, body.occasion);
    let engine = wardrobe.engine();
    let score = engine.score(&items, &request);
    Ok(Json(ScoreResponse {
        score,
        overall: score.overall(),
        reason: engine.explain_reason(&items, &request),
    }))
}

async fn list_looks(State(state): State<AppState>) -> ApiResult<Json<Vec<OutfitLook>>> {
    Ok(Json(state.lock().await.all_looks()?))
}

async fn save_look(
    State(state): State<AppState>,
    Json(look): Json<OutfitLook>,
) -> ApiResult<(StatusCode, Json<OutfitLook>)> {
    if look.item_ids.is_empty() {
        return Err(ApiError::bad_request("a look needs at least one item"));
    }
    let mut wardrobe = state.lock().await;
    let look = state.commit(&mut wardrobe, |w| Ok(w.save_look(look)?))?;
    Ok((StatusCode::CREATED, Json(look)))
}

async fn get_look(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<OutfitLook>> {
    state
        .lock()
        .await
        .get_look(LookId(id))?
        .map(Json)
        .ok_or_else(|| DadaError::not_found("look", id).into())
}

async fn delete_look(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<StatusCode> {
    let mut wardrobe = state.lock().await;
    state.commit(&mut wardrobe, |w| found(w.delete_look(LookId(id))?, "look", id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Turn a store's `false` for a missing record into a 404.
fn found(exists: bool, kind: &'static str, id: u64) -> ApiResult<()> {
    if exists {
        Ok(())
    } else {
        Err(DadaError::not_found(kind, id).into())
    }
}

fn parse_follow(list: Option<&str>) -> ApiResult<Vec<u64>> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| ApiError::bad_request(format!("invalid user id: {s}")))
        })
        .collect()
}

async fn feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> ApiResult<Json<FeedResponse>> {
    let follow = parse_follow(params.follow.as_deref())?;
    let order = parse_feed_order(params.order.as_deref().unwrap_or("mixed"), &follow)?;
    let wardrobe = state.lock().await;
    let posts = match params.q.as_deref() {
        Some(text) => wardrobe.search_posts(text)?,
        None => wardrobe.feed(&order)?,
    };
    Ok(Json(FeedResponse {
        posts,
        trending: wardrobe.trending_topics(TRENDING_TOPICS)?,
    }))
}

async fn publish_post(
    State(state): State<AppState>,
    Json(body): Json<NewPost>,
) -> ApiResult<(StatusCode, Json<CommunityPost>)> {
    let mut post = CommunityPost::new(LOCAL_USER, body.content)
        .with_topics(body.topics)
        .with_tagged_items(body.tagged_items);
    post.image_uris = body.image_uris;
    post.outfit_look_id = body.outfit_look_id;

    let mut wardrobe = state.lock().await;
    let post = state.commit(&mut wardrobe, |w| Ok(w.publish_post(post)?))?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<CommunityPost>> {
    state
        .lock()
        .await
        .get_post(PostId(id))?
        .map(Json)
        .ok_or_else(|| DadaError::not_found("post", id).into())
}

async fn like_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<CommunityPost>> {
    let mut wardrobe = state.lock().await;
    let post = state.commit(&mut wardrobe, |w| {
        w.like_post(PostId(id))?
            .ok_or_else(|| DadaError::not_found("post", id).into())
    })?;
    Ok(Json(post))
}

async fn collect_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<CommunityPost>> {
    let mut wardrobe = state.lock().await;
    let post = state.commit(&mut wardrobe, |w| {
        w.collect_post(PostId(id))?
            .ok_or_else(|| DadaError::not_found("post", id).into())
    })?;
    Ok(Json(post))
}

async fn share_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<CommunityPost>> {
    let mut wardrobe = state.lock().await;
    let post = state.commit(&mut wardrobe, |w| {
        w.share_post(PostId(id))?
            .ok_or_else(|| DadaError::not_found("post", id).into())
    })?;
    Ok(Json(post))
}

async fn hide_post(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<StatusCode> {
    let mut wardrobe = state.lock().await;
    state.commit(&mut wardrobe, |w| found(w.hide_post(PostId(id))?, "post", id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_post(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<StatusCode> {
    let mut wardrobe = state.lock().await;
    state.commit(&mut wardrobe, |w| found(w.delete_post(PostId(id))?, "post", id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<Comment>>> {
    let wardrobe = state.lock().await;
    if wardrobe.get_post(PostId(id))?.is_none() {
        return Err(DadaError::not_found("post", id).into());
    }
    Ok(Json(wardrobe.comments_for_post(PostId(id))?))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<NewComment>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let mut wardrobe = state.lock().await;
    let comment = state.commit(&mut wardrobe, |w| {
        w.add_comment(PostId(id), LOCAL_USER, &body.content, body.parent_comment_id)?
            .ok_or_else(|| DadaError::not_found("post", id).into())
    })?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn get_profile(State(state): State<AppState>) -> ApiResult<Json<UserProfile>> {
    state
        .lock()
        .await
        .profile()?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("profile"))
}

async fn put_profile(
    State(state): State<AppState>,
    Json(mut profile): Json<UserProfile>,
) -> ApiResult<Json<UserProfile>> {
    profile.id = LOCAL_USER;
    let mut wardrobe = state.lock().await;
    let profile = state.commit(&mut wardrobe, |w| Ok(w.save_profile(profile)?))?;
    Ok(Json(profile))
}

// =============================================================================
// ROUTER / SERVER
// =============================================================================

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/status", get(status))
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/items/{id}/favorite", post(toggle_favorite))
        .route("/items/{id}/worn", post(mark_worn))
        .route("/recommend", post(recommend))
        .route("/recommend/from/{id}", post(recommend_from))
        .route("/gaps", post(gaps))
        .route("/score", post(score))
        .route("/looks", get(list_looks).post(save_look))
        .route("/looks/{id}", get(get_look).delete(delete_look))
        .route("/feed", get(feed))
        .route("/posts", post(publish_post))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/posts/{id}/like", post(like_post))
        .route("/posts/{id}/collect", post(collect_post))
        .route("/posts/{id}/share", post(share_post))
        .route("/posts/{id}/hide", post(hide_post))
        .route(
            "/posts/{id}/comments",
            get(list_comments).post(add_comment),
        )
        .route("/profile", get(get_profile).put(put_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .route_layer(middleware::from_fn_with_state(state.clone(), limit_rate));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Resolve once Ctrl+C arrives. If the handler cannot be installed the
/// server keeps running instead of shutting down at once.
async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("received shutdown signal"),
        Err(err) => {
            error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

/// Serve the wardrobe until Ctrl+C.
pub async fn run_server(
    config: ServerConfig,
    wardrobe: CliWardrobe,
    db_path: PathBuf,
) -> Result<(), CliError> {
    config.validate().map_err(CliError::InvalidInput)?;
    let addr = config.socket_addr().map_err(CliError::InvalidInput)?;

    let persist_path = wardrobe.store().as_memory().map(|_| db_path);
    let state = AppState::new(wardrobe, persist_path, config.api_key.clone())
        .with_rate_limit(config.rate_limit);
    let mut app = create_router(state);
    if config.cors_any {
        app = app.layer(CorsLayer::permissive());
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        url = %config.server_url(),
        auth = config.api_key.is_some(),
        rate_limit = config.rate_limit,
        "server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
