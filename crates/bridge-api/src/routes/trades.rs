//! 청산 완료 거래 조회 엔드포인트.
//!
//! 조회 기간의 체결 내역을 터미널에서 가져와 포지션 단위 거래로 재구성합니다.
//!
//! # 엔드포인트
//!
//! - `POST /trades` - 기간 내 청산 완료 거래 목록

use axum::{extract::State, routing::post, Json, Router};
use bridge_core::{session_span, Trade, TerminalCredentials};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, Instrument};

use crate::error::{bad_request, terminal_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 거래 조회 요청.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesRequest {
    /// 터미널 로그인 정보
    pub credentials: TerminalCredentials,
    /// 조회 시작 (생략 시 설정된 기본 시작일)
    #[serde(default)]
    pub from_date: Option<String>,
    /// 조회 종료 (생략 시 현재 시각)
    #[serde(default)]
    pub to_date: Option<String>,
}

impl TradesRequest {
    /// 요청의 조회 기간 `[from, to]`를 계산합니다.
    pub fn window(
        &self,
        default_start: NaiveDate,
        now: DateTime<Utc>,
    ) -> ApiResult<(DateTime<Utc>, DateTime<Utc>)> {
        let from = match &self.from_date {
            Some(raw) => parse_date_param("fromDate", raw)?,
            None => default_start.and_time(chrono::NaiveTime::MIN).and_utc(),
        };
        let to = match &self.to_date {
            Some(raw) => parse_date_param("toDate", raw)?,
            None => now,
        };

        if from > to {
            return Err(bad_request(
                "INVALID_DATE_RANGE",
                format!("fromDate ({}) is after toDate ({})", from, to),
            ));
        }

        Ok((from, to))
    }
}

/// 날짜 파라미터 파싱.
///
/// RFC 3339, 시간대 없는 `YYYY-MM-DDTHH:MM[:SS[.fff]]` (UTC로 간주),
/// `YYYY-MM-DD` (자정)을 허용합니다.
fn parse_date_param(field: &str, raw: &str) -> ApiResult<DateTime<Utc>> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    Err((
        axum::http::StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::with_details(
            "INVALID_DATE",
            format!("Invalid {}: {}", field, raw),
            serde_json::json!({ "field": field, "value": raw }),
        )),
    ))
}

/// 거래 원본 정보.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTradeData {
    /// 포지션 ID
    pub ticket: String,
    /// 데이터 출처 (터미널 이름)
    pub source: String,
    /// 집계된 체결 수
    pub deal_count: usize,
    /// 실제 터미널 데이터 여부 (페이퍼 터미널이면 `false`)
    pub real_data: bool,
}

/// 응답에 포함되는 거래 하나.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    #[serde(flatten)]
    pub trade: Trade,
    pub raw_data: RawTradeData,
}

impl TradeRecord {
    pub fn new(trade: Trade, source: &str, real_data: bool) -> Self {
        let raw_data = RawTradeData {
            ticket: trade.external_trade_id.clone(),
            source: source.to_string(),
            deal_count: trade.deal_count,
            real_data,
        };
        Self { trade, raw_data }
    }
}

/// 거래 조회 응답.
#[derive(Debug, Serialize)]
pub struct TradesResponse {
    pub success: bool,
    pub trades: Vec<TradeRecord>,
}

/// 청산 완료 거래 조회.
///
/// `POST /trades`
pub async fn get_trades(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TradesRequest>,
) -> ApiResult<Json<TradesResponse>> {
    let (from, to) = request.window(state.history_start, Utc::now())?;
    let credentials = &request.credentials;
    let span = session_span!("get_trades", credentials.login, credentials.server);

    async move {
        let mut session = state
            .gateway
            .login(credentials)
            .await
            .map_err(terminal_error)?;
        let trades = session
            .closed_trades(from, to)
            .await
            .map_err(terminal_error)?;
        drop(session);

        info!(
            from = %from,
            to = %to,
            trades = trades.len(),
            "Closed trades fetched"
        );

        let source = state.gateway.name();
        let real_data = !state.gateway.is_simulated();
        Ok(Json(TradesResponse {
            success: true,
            trades: trades
                .into_iter()
                .map(|trade| TradeRecord::new(trade, source, real_data))
                .collect(),
        }))
    }
    .instrument(span)
    .await
}

/// 거래 라우터 생성.
pub fn trades_router() -> Router<Arc<AppState>> {
    Router::new().route("/trades", post(get_trades))
}
