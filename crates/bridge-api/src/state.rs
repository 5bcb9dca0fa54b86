//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.
//! 터미널 세션 자체는 상태에 저장하지 않고, 요청마다 게이트웨이에서 발급받습니다.

use std::sync::Arc;

use bridge_core::{TerminalConnector, TerminalGateway};
use chrono::NaiveDate;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 터미널 게이트웨이 - 세션 직렬화 및 발급
    pub gateway: TerminalGateway,

    /// `fromDate`가 없을 때 사용하는 조회 시작일
    pub history_start: NaiveDate,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # 인자
    /// * `connector` - 터미널 바인딩 구현체
    /// * `history_start` - 기본 조회 시작일
    pub fn new(connector: Arc<dyn TerminalConnector>, history_start: NaiveDate) -> Self {
        Self {
            gateway: TerminalGateway::new(connector),
            history_start,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트 계좌 로그인 번호.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_LOGIN: u64 = 1001;

/// 테스트 계좌 비밀번호.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_PASSWORD: &str = "paper-secret";

/// 테스트 계좌 서버.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_SERVER: &str = "Paper-Demo";

/// 테스트용 상태 생성.
///
/// 청산 완료 포지션 2개(101, 102), 미청산 포지션 1개(103),
/// 입금 체결 1개를 가진 페이퍼 계좌 하나로 구성됩니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use bridge_core::PaperTerminal;

    let fixture = serde_json::json!({
        "accounts": [{
            "password": TEST_PASSWORD,
            "account": {
                "login": TEST_LOGIN,
                "server": TEST_SERVER,
                "balance": 10000,
                "equity": 10100,
                "margin": 50,
                "freeMargin": 10050,
                "currency": "USD",
                "leverage": 500,
                "profit": 100
            },
            "deals": [
                {"positionId": 0, "type": "balance", "entry": "in", "time": 1704067200, "profit": 10000},
                {"positionId": 101, "type": "buy", "entry": "in", "time": 1704153600, "symbol": "EURUSD", "volume": 1, "price": 1.1, "commission": -3},
                {"positionId": 101, "type": "sell", "entry": "out", "time": 1704160800, "symbol": "EURUSD", "volume": 1, "price": 1.105, "profit": 50, "commission": -3},
                {"positionId": 102, "type": "sell", "entry": "in", "time": 1706745600, "symbol": "XAUUSD", "volume": 0.1, "price": 2050, "swap": -1.5},
                {"positionId": 102, "type": "buy", "entry": "out", "time": 1706832000, "symbol": "XAUUSD", "volume": 0.1, "price": 2040, "profit": 100},
                {"positionId": 103, "type": "buy", "entry": "in", "time": 1709251200, "symbol": "GBPUSD", "volume": 0.5, "price": 1.27}
            ]
        }]
    });

    let terminal = PaperTerminal::from_json(&fixture.to_string())
        .unwrap_or_else(|_| PaperTerminal::empty());

    AppState::new(
        Arc::new(terminal),
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
    )
}

/// 초기화가 항상 실패하는 터미널을 가진 테스트용 상태.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_offline_test_state() -> AppState {
    use bridge_core::PaperTerminal;

    AppState::new(
        Arc::new(PaperTerminal::unavailable("terminal not installed")),
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
    )
}
