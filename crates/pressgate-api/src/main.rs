//! Pressgate API 서버 진입점.
//!
//! 설정 우선순위: 기본값 → `config/default.toml` (또는 `--config <path>`) →
//! `PRESSGATE__*` 환경 변수.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, routing::get, Router};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use pressgate_core::{init_logging, AppConfig, ServerConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pressgate_api::metrics::setup_metrics_recorder;
use pressgate_api::middleware::metrics_layer;
use pressgate_api::routes::create_api_router;
use pressgate_api::state::AppState;

/// 서버 실행 인자.
#[derive(Debug, Parser)]
#[command(name = "pressgate-api")]
#[command(about = "Pressgate API 서버", long_about = None)]
#[command(version)]
struct ServerArgs {
    /// 설정 파일 경로 (기본: config/default.toml)
    #[arg(short, long)]
    config: Option<String>,
}

fn load_config(args: &ServerArgs) -> anyhow::Result<AppConfig> {
    match args.config.as_deref() {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("설정 파일을 읽을 수 없습니다: {}", path)),
        None => AppConfig::load_default().context("기본 설정 로드 실패"),
    }
}

/// CORS 레이어.
///
/// `server.cors_enabled`가 꺼져 있으면 CORS 헤더를 붙이지 않습니다.
fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    config.cors_enabled.then(|| {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .max_age(Duration::from_secs(3600))
    })
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    config: &ServerConfig,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let router = Router::new()
        .merge(metrics_router)
        .merge(create_api_router(state))
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ));

    match cors_layer(config) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let args = ServerArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting Pressgate API server...");

    if !config.auth.has_secret() {
        warn!(
            "auth.jwt_secret is not set (PRESSGATE__AUTH__JWT_SECRET); \
             claim tokens cannot be issued and guarded routes will reject every request"
        );
    }

    let metrics_handle = setup_metrics_recorder().context("Prometheus 레코더 설치 실패")?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .with_context(|| format!("잘못된 바인딩 주소: {}", config.server.bind_address()))?;

    let state = Arc::new(AppState::in_memory(&config.auth));
    info!(
        version = %state.version,
        can_sign = state.minter.can_sign(),
        claim_ttl_secs = state.minter.claim_ttl_secs(),
        "Application state initialized"
    );

    let app = create_router(state, metrics_handle, &config.server);

    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("{} 바인딩 실패", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기 (Ctrl+C 또는 SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
