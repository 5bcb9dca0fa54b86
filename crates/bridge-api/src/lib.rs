//! 트레이딩 터미널 REST 브리지 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 터미널 에러의 HTTP 응답 변환
//! - 헬스 체크 엔드포인트
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`error`]: 통합 에러 응답

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::*;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_offline_test_state, create_test_state};

/// 미들웨어가 적용된 전체 라우터를 생성합니다.
///
/// 요청 추적, 전역 타임아웃(408), 모든 origin 허용 CORS가 적용됩니다.
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
}
