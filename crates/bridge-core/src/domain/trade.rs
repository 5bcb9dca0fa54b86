//! 청산 완료 거래 기록.
//!
//! 진입 체결과 청산 체결이 모두 확인된 포지션 하나를 요약한 보고용 타입입니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DealKind;
use crate::types::{Amount, Price, Quantity};

/// 거래 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    /// 매수 포지션
    Buy,
    /// 매도 포지션
    Sell,
}

impl From<DealKind> for TradeType {
    /// 진입 체결 유형으로부터 거래 방향을 결정합니다. 매수가 아니면 매도입니다.
    fn from(kind: DealKind) -> Self {
        match kind {
            DealKind::Buy => TradeType::Buy,
            _ => TradeType::Sell,
        }
    }
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeType::Buy => write!(f, "BUY"),
            TradeType::Sell => write!(f, "SELL"),
        }
    }
}

/// 청산이 완료된 포지션의 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// 외부 거래 ID (터미널 포지션 ID의 문자열 형태)
    pub external_trade_id: String,
    /// 거래 심볼 (진입 체결 기준)
    pub symbol: String,
    /// 거래 방향 (진입 체결 기준)
    pub trade_type: TradeType,
    /// 진입 시각
    pub open_time: DateTime<Utc>,
    /// 청산 시각
    pub close_time: DateTime<Utc>,
    /// 진입 수량
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Quantity,
    /// 진입 가격
    #[serde(with = "rust_decimal::serde::float")]
    pub open_price: Price,
    /// 청산 가격
    #[serde(with = "rust_decimal::serde::float")]
    pub close_price: Price,
    /// 포지션 전체 체결의 손익 합계
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Amount,
    /// 포지션 전체 체결의 수수료 합계
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Amount,
    /// 포지션 전체 체결의 스왑 합계
    #[serde(with = "rust_decimal::serde::float")]
    pub swap: Amount,
    /// 집계된 체결 수
    pub deal_count: usize,
}
