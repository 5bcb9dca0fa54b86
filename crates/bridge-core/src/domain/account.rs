//! 터미널 계좌 정보.

use serde::{Deserialize, Serialize};

use crate::types::Amount;

/// 로그인된 계좌의 전체 정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// 계좌 로그인 번호
    pub login: u64,
    /// 거래 서버 이름
    pub server: String,
    /// 잔고
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Amount,
    /// 평가 자산
    #[serde(with = "rust_decimal::serde::float")]
    pub equity: Amount,
    /// 사용 증거금
    #[serde(default, with = "rust_decimal::serde::float")]
    pub margin: Amount,
    /// 가용 증거금
    #[serde(default, with = "rust_decimal::serde::float")]
    pub free_margin: Amount,
    /// 계좌 통화
    pub currency: String,
    /// 레버리지 (예: 100 = 1:100)
    pub leverage: u32,
    /// 미실현 손익
    #[serde(default, with = "rust_decimal::serde::float")]
    pub profit: Amount,
}

/// 연결 확인 응답에 사용되는 계좌 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub login: u64,
    pub server: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Amount,
    #[serde(with = "rust_decimal::serde::float")]
    pub equity: Amount,
    pub currency: String,
    pub leverage: u32,
}

impl From<&AccountInfo> for AccountSummary {
    fn from(info: &AccountInfo) -> Self {
        Self {
            login: info.login,
            server: info.server.clone(),
            balance: info.balance,
            equity: info.equity,
            currency: info.currency.clone(),
            leverage: info.leverage,
        }
    }
}
