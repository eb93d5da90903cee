//! Authgate API 서버.
//!
//! 설정을 로드하고 서명 키를 검증한 뒤 Axum 서버를 시작합니다.
//! 서명 키가 없거나 잘못되었으면 서버는 시작되지 않습니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use authgate_api::metrics::setup_metrics_recorder;
use authgate_api::middleware::metrics_layer;
use authgate_api::openapi::swagger_ui_router;
use authgate_api::repository::{run_migrations, PgUserStore};
use authgate_api::routes::create_app;
use authgate_api::state::AppState;
use authgate_core::{init_logging, AppConfig, DatabaseConfig, LogConfig, UserStore};

/// CORS 레이어.
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록. 없으면 모든 origin 허용
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
        AllowOrigin::any()
    } else {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_app(state))
        .merge(swagger_ui_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

/// 사용자 저장소 선택.
///
/// `database.url`이 있으면 PostgreSQL에 연결하고 마이그레이션을 실행합니다.
async fn create_user_store(
    config: &DatabaseConfig,
) -> anyhow::Result<(Arc<dyn UserStore>, Option<sqlx::PgPool>)> {
    let Some(url) = config.url.as_deref() else {
        warn!("database.url not set, using in-memory user store (data is lost on restart)");
        return Ok((Arc::new(authgate_core::InMemoryUserStore::new()), None));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!(max_connections = config.max_connections, "Database pool created");

    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    Ok((Arc::new(PgUserStore::new(pool.clone())), Some(pool)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("failed to load configuration")?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Starting Authgate API server...");

    // 서명 키는 시작 시 한 번만 로드되며 실패하면 기동하지 않음
    let signing_key = config
        .jwt
        .signing_key()
        .context("invalid JWT signing key (set AUTHGATE__JWT__SECRET)")?;
    let lifetimes = config.jwt.lifetimes()?;
    info!(
        access_ttl_secs = lifetimes.access().num_seconds(),
        refresh_ttl_secs = lifetimes.refresh().num_seconds(),
        "Token lifetimes configured"
    );

    let metrics_handle =
        setup_metrics_recorder().context("failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");

    let (store, db_pool) = create_user_store(&config.database).await?;

    let mut state = AppState::new(signing_key, lifetimes, store);
    if let Some(pool) = db_pool {
        state = state.with_db_pool(pool);
    }
    let state = Arc::new(state);
    info!(version = %state.version, has_db = state.db_pool.is_some(), "Application state initialized");

    let app = create_router(state, metrics_handle);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
