//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (터미널 초기화 가능 여부 포함)
//! - `/health/live` - liveness probe
//! - `/connect` - 계좌 로그인 확인 및 계좌 요약
//! - `/disconnect` - 터미널 종료
//! - `/account-info` - 계좌 상세 정보
//! - `/trades` - 기간별 청산 완료 거래 내역

pub mod account;
pub mod health;
pub mod trades;

pub use account::{account_router, DataResponse, SuccessResponse};
pub use health::{health_router, HealthResponse};
pub use trades::{trades_router, RawTradeData, TradeRecord, TradesRequest, TradesResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .merge(account_router())
        .merge(trades_router())
}
