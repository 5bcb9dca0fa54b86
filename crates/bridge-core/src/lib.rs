//! # Bridge Core
//!
//! 트레이딩 터미널 브리지의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 브리지 서버 전반에서 사용되는 기본 타입을 제공합니다:
//! - 체결(Deal) 및 청산 완료 거래(Trade) 타입
//! - 체결 내역으로부터 거래를 재구성하는 리듀서
//! - 터미널 세션 추상화 (커넥터, 세션 핸들, 게이트웨이)
//! - 개발/테스트용 페이퍼 터미널
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod terminal;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use terminal::{
    PaperTerminal, Session, TerminalConnector, TerminalCredentials, TerminalGateway,
    TerminalSession,
};
pub use types::*;
