//! 정밀한 금융 계산을 위한 Decimal 유틸리티.
//!
//! 터미널이 보고하는 가격, 수량, 손익 값은 모두 `Decimal`로 다룹니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 거래 수량(랏)을 위한 타입.
pub type Quantity = Decimal;

/// 손익, 수수료, 스왑 등 금액 타입.
pub type Amount = Decimal;

/// 누락되었거나 `null`인 숫자 필드를 0으로 역직렬화합니다.
///
/// 터미널 응답에서 손익/수수료/스왑 값이 비어 있는 경우가 있으므로,
/// 합계 계산에 `null`이 전파되지 않도록 0으로 취급합니다.
/// 필드에는 `#[serde(default)]`를 함께 지정해야 누락된 경우도 처리됩니다.
pub fn zero_if_null<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Decimal>::deserialize(deserializer).map(Option::unwrap_or_default)
}
