//! 헬스 체크 endpoint.
//!
//! 서버 상태와 터미널 초기화 가능 여부를 확인합니다.
//! 로드밸런서나 오케스트레이션 시스템(Kubernetes 등)에서 사용됩니다.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// 서버 상태 (항상 "ok")
    pub status: String,

    /// 터미널 초기화 성공 여부
    pub terminal_initialized: bool,

    /// 터미널 바인딩 이름
    pub terminal: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health/live
pub async fn health_live() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크.
///
/// 터미널이 초기화 불가능해도 서버는 응답 가능하므로 200을 반환하고,
/// 상태는 `terminalInitialized` 필드로 전달합니다.
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let terminal_initialized = state.gateway.is_available().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        terminal_initialized,
        terminal: state.gateway.name().to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(health_live))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::state::{create_offline_test_state, create_test_state};

    async fn get_health(state: AppState) -> HealthResponse {
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(Arc::new(state));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_live_returns_ok() {
        let app = Router::new().route("/health/live", get(health_live));

        let response = app
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_reports_terminal() {
        let health = get_health(create_test_state()).await;

        assert_eq!(health.status, "ok");
        assert!(health.terminal_initialized);
        assert_eq!(health.terminal, "paper");
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_health_reports_offline_terminal() {
        let health = get_health(create_offline_test_state()).await;

        assert_eq!(health.status, "ok");
        assert!(!health.terminal_initialized);
    }
}
