//! 터미널 브리지의 에러 타입.
//!
//! 터미널 바인딩이 보고하는 실패를 종류와 메시지를 가진 값으로 표현합니다.
//! HTTP 상태 코드로의 변환은 API 경계에서 수행합니다.

use thiserror::Error;

/// 터미널 작업 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerminalError {
    /// 터미널 초기화 실패
    #[error("Terminal initialization failed: {0}")]
    Initialization(String),

    /// 로그인 실패 (계좌, 비밀번호, 서버 불일치)
    #[error("Login failed: {0}")]
    Authentication(String),

    /// 계좌 정보 조회 실패
    #[error("Failed to get account info: {0}")]
    AccountUnavailable(String),

    /// 체결 내역 조회 실패
    #[error("Failed to get deals: {0}")]
    History(String),

    /// 기타 내부 에러
    #[error("{0}")]
    Internal(String),
}

/// 에러 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalErrorKind {
    Initialization,
    Authentication,
    AccountUnavailable,
    History,
    Internal,
}

/// 터미널 작업을 위한 Result 타입.
pub type TerminalResult<T> = Result<T, TerminalError>;

impl TerminalError {
    /// 에러 종류를 반환합니다.
    pub fn kind(&self) -> TerminalErrorKind {
        match self {
            TerminalError::Initialization(_) => TerminalErrorKind::Initialization,
            TerminalError::Authentication(_) => TerminalErrorKind::Authentication,
            TerminalError::AccountUnavailable(_) => TerminalErrorKind::AccountUnavailable,
            TerminalError::History(_) => TerminalErrorKind::History,
            TerminalError::Internal(_) => TerminalErrorKind::Internal,
        }
    }

    /// 인증 실패인지 확인합니다.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, TerminalError::Authentication(_))
    }
}

impl From<serde_json::Error> for TerminalError {
    fn from(err: serde_json::Error) -> Self {
        TerminalError::Initialization(err.to_string())
    }
}
