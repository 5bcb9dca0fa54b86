//! 계좌 연결 관리 핸들러.
//!
//! # 엔드포인트
//!
//! - `POST /connect` - 로그인 확인 후 계좌 요약 반환
//! - `POST /disconnect` - 터미널 종료
//! - `POST /account-info` - 계좌 상세 정보 조회
//!
//! 각 요청은 게이트웨이에서 세션을 새로 발급받아 사용하며,
//! 핸들러가 끝나면 세션은 자동으로 닫힙니다.

use axum::{extract::State, routing::post, Json, Router};
use bridge_core::{session_span, AccountInfo, AccountSummary, TerminalCredentials};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, Instrument};

use crate::error::{terminal_error, ApiResult};
use crate::state::AppState;

/// 데이터를 포함한 성공 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    /// 항상 `true`
    pub success: bool,
    /// 응답 데이터
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// 데이터가 없는 성공 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// 계좌 로그인 확인.
///
/// `POST /connect`
pub async fn connect(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<TerminalCredentials>,
) -> ApiResult<Json<DataResponse<AccountSummary>>> {
    let span = session_span!("connect", credentials.login, credentials.server);

    async move {
        let info = fetch_account_info(&state, &credentials).await?;
        info!(currency = %info.currency, "Terminal connection verified");
        Ok(Json(DataResponse::new(AccountSummary::from(&info))))
    }
    .instrument(span)
    .await
}

/// 터미널 종료.
///
/// 진행 중인 세션이 있으면 끝날 때까지 기다린 뒤 종료합니다.
///
/// `POST /disconnect`
pub async fn disconnect(State(state): State<Arc<AppState>>) -> Json<SuccessResponse> {
    state.gateway.disconnect().await;
    Json(SuccessResponse { success: true })
}

/// 계좌 상세 정보 조회.
///
/// `POST /account-info`
pub async fn account_info(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<TerminalCredentials>,
) -> ApiResult<Json<DataResponse<AccountInfo>>> {
    let span = session_span!("account_info", credentials.login, credentials.server);

    async move {
        let info = fetch_account_info(&state, &credentials).await?;
        Ok(Json(DataResponse::new(info)))
    }
    .instrument(span)
    .await
}

async fn fetch_account_info(
    state: &AppState,
    credentials: &TerminalCredentials,
) -> ApiResult<AccountInfo> {
    let mut session = state
        .gateway
        .login(credentials)
        .await
        .map_err(terminal_error)?;

    session.account_info().await.map_err(terminal_error)
}

/// 계좌 라우터 생성.
pub fn account_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
        .route("/account-info", post(account_info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::{
        create_offline_test_state, create_test_state, TEST_LOGIN, TEST_PASSWORD, TEST_SERVER,
    };

    async fn post_json(state: AppState, uri: &str, body: Value) -> (StatusCode, Value) {
        let app = account_router().with_state(Arc::new(state));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn credentials() -> Value {
        json!({"login": TEST_LOGIN, "password": TEST_PASSWORD, "server": TEST_SERVER})
    }

    #[tokio::test]
    async fn test_connect_returns_account_summary() {
        let (status, body) = post_json(create_test_state(), "/connect", credentials()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["login"], TEST_LOGIN);
        assert_eq!(body["data"]["server"], TEST_SERVER);
        assert_eq!(body["data"]["currency"], "USD");
        assert_eq!(body["data"]["leverage"], 500);
        assert!(body["data"].get("freeMargin").is_none());
    }

    #[tokio::test]
    async fn test_connect_accepts_string_login() {
        let body = json!({
            "login": TEST_LOGIN.to_string(),
            "password": TEST_PASSWORD,
            "server": TEST_SERVER
        });
        let (status, _) = post_json(create_test_state(), "/connect", body).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_connect_wrong_password_is_unauthorized() {
        let body = json!({"login": TEST_LOGIN, "password": "nope", "server": TEST_SERVER});
        let (status, body) = post_json(create_test_state(), "/connect", body).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "LOGIN_FAILED");
        assert!(!body["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_connect_offline_terminal() {
        let (status, body) = post_json(create_offline_test_state(), "/connect", credentials()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "TERMINAL_INIT_FAILED");
    }

    #[tokio::test]
    async fn test_account_info_returns_all_fields() {
        let (status, body) = post_json(create_test_state(), "/account-info", credentials()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["balance"], 10000.0);
        assert_eq!(body["data"]["freeMargin"], 10050.0);
        assert_eq!(body["data"]["margin"], 50.0);
        assert_eq!(body["data"]["profit"], 100.0);
    }

    #[tokio::test]
    async fn test_disconnect() {
        let (status, body) = post_json(create_test_state(), "/disconnect", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let (status, _) =
            post_json(create_test_state(), "/connect", json!({"login": TEST_LOGIN})).await;
        assert!(status.is_client_error());
    }
}
