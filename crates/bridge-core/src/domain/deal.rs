//! 터미널 체결(Deal) 기록.
//!
//! 이 모듈은 터미널이 보고하는 개별 체결 관련 타입을 정의합니다:
//! - `DealKind` - 체결 유형 (매수, 매도, 기타 잔고 작업)
//! - `DealEntry` - 포지션 진입/청산 구분
//! - `Deal` - 개별 체결 기록

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{zero_if_null, Amount, Price, Quantity};

/// 포지션에 속하지 않는 체결을 나타내는 포지션 ID.
pub const NO_POSITION: u64 = 0;

/// 체결 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealKind {
    /// 매수 체결
    Buy,
    /// 매도 체결
    Sell,
    /// 입출금, 크레딧, 정정 등 거래가 아닌 작업
    #[serde(other)]
    Other,
}

impl DealKind {
    /// 매수 또는 매도 체결인지 확인합니다.
    pub fn is_trade(&self) -> bool {
        matches!(self, DealKind::Buy | DealKind::Sell)
    }
}

/// 포지션 진입/청산 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealEntry {
    /// 포지션 진입 (노출 증가)
    In,
    /// 포지션 청산 (노출 감소)
    Out,
    /// 반대 방향 전환
    InOut,
    /// 기타 (상쇄 청산 등)
    #[serde(other)]
    Other,
}

/// 터미널이 보고하는 단일 체결 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// 터미널 체결 티켓
    #[serde(default)]
    pub ticket: u64,
    /// 소속 포지션 ID (`NO_POSITION`이면 추적 대상 아님)
    pub position_id: u64,
    /// 체결 유형
    #[serde(alias = "type")]
    pub kind: DealKind,
    /// 진입/청산 구분
    pub entry: DealEntry,
    /// 체결 시각 (epoch 초, UTC)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
    /// 거래 심볼
    #[serde(default)]
    pub symbol: String,
    /// 체결 수량
    #[serde(default, deserialize_with = "zero_if_null")]
    pub volume: Quantity,
    /// 체결 가격
    #[serde(default, deserialize_with = "zero_if_null")]
    pub price: Price,
    /// 실현 손익
    #[serde(default, deserialize_with = "zero_if_null")]
    pub profit: Amount,
    /// 수수료
    #[serde(default, deserialize_with = "zero_if_null")]
    pub commission: Amount,
    /// 스왑
    #[serde(default, deserialize_with = "zero_if_null")]
    pub swap: Amount,
}

impl Deal {
    /// 새 체결 기록을 생성합니다. 금액 필드는 0으로 시작합니다.
    pub fn new(
        position_id: u64,
        kind: DealKind,
        entry: DealEntry,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            ticket: 0,
            position_id,
            kind,
            entry,
            time,
            symbol: String::new(),
            volume: Quantity::ZERO,
            price: Price::ZERO,
            profit: Amount::ZERO,
            commission: Amount::ZERO,
            swap: Amount::ZERO,
        }
    }

    /// 체결 티켓을 설정합니다.
    pub fn with_ticket(mut self, ticket: u64) -> Self {
        self.ticket = ticket;
        self
    }

    /// 심볼을 설정합니다.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// 수량과 가격을 설정합니다.
    pub fn with_fill(mut self, volume: Quantity, price: Price) -> Self {
        self.volume = volume;
        self.price = price;
        self
    }

    /// 실현 손익을 설정합니다.
    pub fn with_profit(mut self, profit: Amount) -> Self {
        self.profit = profit;
        self
    }

    /// 수수료와 스왑을 설정합니다.
    pub fn with_costs(mut self, commission: Amount, swap: Amount) -> Self {
        self.commission = commission;
        self.swap = swap;
        self
    }

    /// 추적 가능한 포지션에 속하는지 확인합니다.
    pub fn has_position(&self) -> bool {
        self.position_id != NO_POSITION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deal_kind_is_trade() {
        assert!(DealKind::Buy.is_trade());
        assert!(DealKind::Sell.is_trade());
        assert!(!DealKind::Other.is_trade());
    }

    #[test]
    fn test_deal_deserialize_terminal_record() {
        let json = r#"{
            "ticket": 5001,
            "positionId": 10,
            "type": "buy",
            "entry": "in",
            "time": 1704067200,
            "symbol": "EURUSD",
            "volume": 1.0,
            "price": 1.1,
            "profit": 0,
            "commission": -3.5,
            "swap": null
        }"#;

        let deal: Deal = serde_json::from_str(json).unwrap();
        assert_eq!(deal.ticket, 5001);
        assert_eq!(deal.position_id, 10);
        assert_eq!(deal.kind, DealKind::Buy);
        assert_eq!(deal.entry, DealEntry::In);
        assert_eq!(deal.time.timestamp(), 1_704_067_200);
        assert_eq!(deal.price, dec!(1.1));
        assert_eq!(deal.commission, dec!(-3.5));
        assert_eq!(deal.swap, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_kinds_map_to_other() {
        let json = r#"{"positionId": 0, "kind": "balance", "entry": "out_by", "time": 0}"#;
        let deal: Deal = serde_json::from_str(json).unwrap();
        assert_eq!(deal.kind, DealKind::Other);
        assert_eq!(deal.entry, DealEntry::Other);
        assert!(!deal.has_position());
        assert_eq!(deal.profit, Decimal::ZERO);
    }
}
