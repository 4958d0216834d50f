use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use seatlock_core::types::{SeatId, SeatRecord, UnlockOutcome};
use seatlock_core::{Registry, RegistryConfig};

use crate::handlers::*;

#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    /// Bearer token for `/admin`; `None` leaves admin routes open
    pub admin_key: Option<Arc<str>>,
}

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seats: u32,
    pub lock_ttl_ms: u64,
    pub expiry_margin_ms: u64,
    pub admin_key: Option<String>,
}

impl ServerConfig {
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new(self.seats, Duration::from_millis(self.lock_ttl_ms))
            .with_expiry_margin(Duration::from_millis(self.expiry_margin_ms))
    }
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let registry =
        Registry::new(config.registry_config()).context("invalid registry configuration")?;

    let admin_key: Option<Arc<str>> = config
        .admin_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .map(Arc::from);

    if admin_key.is_some() {
        tracing::info!("🔐 Admin key authentication enabled");
    } else {
        tracing::warn!("⚠️  No SEATLOCK_ADMIN_KEY set — admin routes are open (dev mode)");
    }

    let app = router(AppState {
        registry,
        admin_key,
    });

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        seats = config.seats,
        lock_ttl_ms = config.lock_ttl_ms,
        "🎟️  Seatlock server starting on http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/seats", get(list_seats_detailed))
        .route("/seats/{id}", get(get_seat))
        .route("/seats/{id}/unlock", post(unlock_seat))
        .route("/sweep", post(sweep_expired))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    Router::new()
        .route("/health", get(health))
        .route("/seats", get(list_seats))
        .route("/seats/{id}/lock", post(lock_seat))
        .route("/seats/{id}/confirm", post(confirm_seat))
        .route("/seats/{id}/release", post(release_seat))
        .nest("/admin", admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─── Auth Middleware ────────────────────────────────────────────────────────

async fn admin_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected_key) = state.admin_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if token == expected_key {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("🚫 Unauthorized request to {}", request.uri().path());
        Err(StatusCode::UNAUTHORIZED)
    }
}

// ─── Handlers ───────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        seats: state.registry.stats(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn list_seats(State(state): State<AppState>) -> Json<ApiResponse<Vec<SeatRecord>>> {
    Json(ApiResponse::ok(state.registry.list()))
}

async fn lock_seat(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<SeatRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SeatRecord>>), ApiError> {
    req.validate()?;
    let seat = SeatId(id);

    match state.registry.lock(seat, &req.user) {
        Ok(record) => {
            tracing::info!(%seat, user = %req.user, "Seat locked");
            Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
        }
        Err(e) => {
            tracing::info!(%seat, user = %req.user, code = e.code(), "Lock denied");
            Err(e.into())
        }
    }
}

async fn confirm_seat(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<SeatRequest>,
) -> Result<Json<ApiResponse<SeatRecord>>, ApiError> {
    req.validate()?;
    let seat = SeatId(id);

    let record = state.registry.confirm(seat, &req.user).inspect_err(|e| {
        tracing::info!(%seat, user = %req.user, code = e.code(), "Confirm denied");
    })?;
    tracing::info!(%seat, user = %req.user, "Seat booked");
    Ok(Json(ApiResponse::ok(record)))
}

async fn release_seat(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<SeatRequest>,
) -> Result<Json<ApiResponse<SeatRecord>>, ApiError> {
    req.validate()?;
    let seat = SeatId(id);

    let record = state.registry.release(seat, &req.user).inspect_err(|e| {
        tracing::info!(%seat, user = %req.user, code = e.code(), "Release denied");
    })?;
    tracing::info!(%seat, user = %req.user, "Seat released");
    Ok(Json(ApiResponse::ok(record)))
}

async fn list_seats_detailed(State(state): State<AppState>) -> Json<ApiResponse<Vec<SeatRecord>>> {
    Json(ApiResponse::ok(state.registry.list_detailed()))
}

async fn get_seat(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<ApiResponse<SeatRecord>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.registry.get(SeatId(id))?)))
}

async fn unlock_seat(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<ApiResponse<UnlockOutcome>>, ApiError> {
    let seat = SeatId(id);
    let outcome = state.registry.unlock(seat)?;
    if let UnlockOutcome::AlreadyAvailable(_) = outcome {
        tracing::info!(%seat, "Unlock requested on an available seat");
    }
    Ok(Json(ApiResponse::ok(outcome)))
}

async fn sweep_expired(State(state): State<AppState>) -> Json<ApiResponse<SweepResponse>> {
    let swept = state.registry.sweep_expired();
    Json(ApiResponse::ok(SweepResponse { swept }))
}
