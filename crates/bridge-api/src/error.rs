//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! 터미널 에러는 이 모듈에서 HTTP 상태 코드와 에러 코드로 변환됩니다.

use axum::{http::StatusCode, Json};
use bridge_core::{TerminalError, TerminalErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "success": false,
///   "code": "LOGIN_FAILED",
///   "error": "Login failed: authorization failed for account 1001 on Demo",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 항상 `false`
    pub success: bool,
    /// 에러 코드 (예: "LOGIN_FAILED", "INVALID_DATE")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            error: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.error)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 400 Bad Request 에러를 생성합니다.
pub fn bad_request(
    code: impl Into<String>,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new(code, message)),
    )
}

/// 터미널 에러 종류별 HTTP 상태 코드와 에러 코드.
pub fn terminal_status(kind: TerminalErrorKind) -> (StatusCode, &'static str) {
    match kind {
        TerminalErrorKind::Initialization => (StatusCode::BAD_REQUEST, "TERMINAL_INIT_FAILED"),
        TerminalErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "LOGIN_FAILED"),
        TerminalErrorKind::AccountUnavailable => {
            (StatusCode::BAD_REQUEST, "ACCOUNT_INFO_UNAVAILABLE")
        }
        TerminalErrorKind::History => (StatusCode::BAD_REQUEST, "HISTORY_UNAVAILABLE"),
        TerminalErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "TERMINAL_ERROR"),
    }
}

/// 터미널 에러를 API 에러 응답으로 변환합니다.
///
/// `.map_err(terminal_error)` 형태로 사용합니다.
pub fn terminal_error(err: TerminalError) -> (StatusCode, Json<ApiErrorResponse>) {
    let (status, code) = terminal_status(err.kind());
    (status, Json(ApiErrorResponse::new(code, err.to_string())))
}
