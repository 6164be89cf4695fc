use crate::core::lookup::LookupProxy;
use crate::domain::model::{Envelope, LookupOutcome, Query};
use crate::domain::ports::{ConfigProvider, NumberLookup};
use crate::utils::error::Result;
use axum::{
    extract::{Query as QueryParams, State},
    http::{header, HeaderValue, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

/// 服務的共享狀態
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<dyn NumberLookup>,
}

/// /api 的查詢參數
#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub num: Option<String>,
}

/// 號碼查詢代理的 HTTP 伺服器
pub struct ProxyServer {
    host: String,
    port: u16,
    state: AppState,
}

impl ProxyServer {
    pub fn new<C: ConfigProvider + 'static>(config: C) -> Self {
        let host = config.host().to_string();
        let port = config.port();
        let lookup: Arc<dyn NumberLookup> = Arc::new(LookupProxy::new(config));

        Self {
            host,
            port,
            state: AppState { lookup },
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.lookup.clone())
    }

    /// 啟動伺服器並開始服務
    pub async fn start(self) -> Result<()> {
        let app = self.router();
        let addr = format!("{}:{}", self.host, self.port);

        tracing::info!("🚀 Starting Number Info API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// 組裝路由，所有回應都附上寬鬆的 CORS 標頭
pub fn create_router(lookup: Arc<dyn NumberLookup>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api", get(lookup_number))
        .route("/health", get(health_check))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type,Authorization"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,PUT,POST,DELETE,OPTIONS"),
        ))
        .with_state(AppState { lookup })
}

async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": true,
        "message": "Number Info API",
        "endpoint": "/api?num=MOBILE_NUMBER"
    }))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "numinfo-proxy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// 查詢端點：驗證 → 查詢（含重試）→ 包裝回應
async fn lookup_number(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<LookupParams>,
) -> (StatusCode, Json<Envelope>) {
    let raw = params.num.unwrap_or_default();

    let query = match Query::parse(&raw) {
        Ok(query) => query,
        Err(e) => {
            tracing::warn!("Rejected lookup request: {}", e);
            return (StatusCode::BAD_REQUEST, Json(Envelope::failure()));
        }
    };

    match state.lookup.lookup(&query).await {
        LookupOutcome::Found(records) => (StatusCode::OK, Json(Envelope::success(records))),
        // 重試耗盡沿用上游的慣例：HTTP 200 搭配失敗狀態
        LookupOutcome::Exhausted => (StatusCode::OK, Json(Envelope::failure())),
    }
}
