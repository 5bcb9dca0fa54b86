//! 체결 내역으로부터 청산 완료 거래를 재구성합니다.
//!
//! 터미널은 포지션 단위가 아닌 체결 단위로 내역을 보고합니다.
//! 이 모듈은 같은 포지션 ID를 가진 체결들을 묶어 진입/청산이 모두
//! 확인된 포지션만 `Trade`로 요약합니다.
//!
//! 규칙:
//! - 매수/매도가 아닌 체결(입출금, 크레딧 등)은 제외
//! - 포지션 ID가 `NO_POSITION`인 체결은 제외
//! - 포지션별로 시각 오름차순 안정 정렬 (동일 시각은 입력 순서 유지)
//! - 진입(`In`)과 청산(`Out`)이 모두 있어야 거래로 인정 (아니면 미청산으로 간주)
//! - 첫 체결이 진입, 마지막 체결이 청산
//! - 손익/수수료/스왑은 부분 청산을 포함한 전체 체결의 합계
//! - 합계가 `Decimal` 범위를 넘는 포지션은 경고 로그와 함께 제외

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{Deal, DealEntry, Trade, TradeType};

/// 체결 목록에서 청산 완료 거래 목록을 재구성합니다.
///
/// 출력 순서는 각 포지션 ID가 입력에 처음 등장한 순서입니다.
/// 빈 입력은 빈 출력을 반환하며, 이 함수는 실패하지 않습니다.
///
/// # 예제
///
/// ```
/// use bridge_core::{reconstruct, Deal, DealEntry, DealKind};
/// use chrono::DateTime;
///
/// let open = DateTime::from_timestamp(100, 0).unwrap();
/// let close = DateTime::from_timestamp(200, 0).unwrap();
/// let deals = vec![
///     Deal::new(10, DealKind::Buy, DealEntry::In, open),
///     Deal::new(10, DealKind::Sell, DealEntry::Out, close),
/// ];
///
/// let trades = reconstruct(&deals);
/// assert_eq!(trades.len(), 1);
/// assert_eq!(trades[0].external_trade_id, "10");
/// ```
pub fn reconstruct(deals: &[Deal]) -> Vec<Trade> {
    let groups = group_by_position(deals);
    let trades: Vec<Trade> = groups
        .into_iter()
        .filter_map(|(position_id, group)| summarize(position_id, group))
        .collect();

    debug!(
        deals = deals.len(),
        trades = trades.len(),
        "Reconstructed closed trades"
    );

    trades
}

/// 거래 체결만 남겨 포지션 ID별로 묶습니다 (첫 등장 순서 유지).
fn group_by_position(deals: &[Deal]) -> Vec<(u64, Vec<&Deal>)> {
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut groups: Vec<(u64, Vec<&Deal>)> = Vec::new();

    for deal in deals {
        if !deal.kind.is_trade() || !deal.has_position() {
            continue;
        }

        let slot = *index.entry(deal.position_id).or_insert_with(|| {
            groups.push((deal.position_id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(deal);
    }

    groups
}

/// 한 포지션의 체결을 거래로 요약합니다. 미청산 포지션이면 `None`.
fn summarize(position_id: u64, mut group: Vec<&Deal>) -> Option<Trade> {
    // sort_by_key는 안정 정렬
    group.sort_by_key(|deal| deal.time);

    let has_entry = group.iter().any(|deal| deal.entry == DealEntry::In);
    let has_exit = group.iter().any(|deal| deal.entry == DealEntry::Out);
    if !(has_entry && has_exit) {
        return None;
    }

    let open_deal = group.first()?;
    let close_deal = group.last()?;

    let totals = checked_total(&group, |deal| deal.profit).zip(
        checked_total(&group, |deal| deal.commission)
            .zip(checked_total(&group, |deal| deal.swap)),
    );
    let Some((profit, (commission, swap))) = totals else {
        warn!(
            position_id,
            open_ticket = open_deal.ticket,
            close_ticket = close_deal.ticket,
            "Deal totals overflow, position skipped"
        );
        return None;
    };

    Some(Trade {
        external_trade_id: position_id.to_string(),
        symbol: open_deal.symbol.clone(),
        trade_type: TradeType::from(open_deal.kind),
        open_time: open_deal.time,
        close_time: close_deal.time,
        quantity: open_deal.volume,
        open_price: open_deal.price,
        close_price: close_deal.price,
        profit,
        commission,
        swap,
        deal_count: group.len(),
    })
}

/// 오버플로 시 `None`을 반환하는 합계.
fn checked_total(group: &[&Deal], field: impl Fn(&Deal) -> Decimal) -> Option<Decimal> {
    group
        .iter()
        .try_fold(Decimal::ZERO, |acc, deal| acc.checked_add(field(*deal)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DealKind, NO_POSITION};
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn deal(position_id: u64, kind: DealKind, entry: DealEntry, secs: i64) -> Deal {
        Deal::new(position_id, kind, entry, at(secs)).with_symbol("EURUSD")
    }

    #[test]
    fn test_round_trip_position() {
        let deals = vec![
            deal(10, DealKind::Buy, DealEntry::In, 100).with_fill(dec!(1), dec!(1.1000)),
            deal(10, DealKind::Sell, DealEntry::Out, 200)
                .with_fill(dec!(1), dec!(1.1050))
                .with_profit(dec!(50)),
        ];

        let trades = reconstruct(&deals);
        assert_eq!(trades.len(), 1);

        let trade = &trades[0];
        assert_eq!(trade.external_trade_id, "10");
        assert_eq!(trade.trade_type, TradeType::Buy);
        assert_eq!(trade.symbol, "EURUSD");
        assert_eq!(trade.quantity, dec!(1));
        assert_eq!(trade.open_price, dec!(1.1000));
        assert_eq!(trade.close_price, dec!(1.1050));
        assert_eq!(trade.open_time, at(100));
        assert_eq!(trade.close_time, at(200));
        assert_eq!(trade.profit, dec!(50));
        assert_eq!(trade.deal_count, 2);
    }

    #[test]
    fn test_open_position_excluded() {
        let deals = vec![deal(11, DealKind::Buy, DealEntry::In, 100)];
        assert!(reconstruct(&deals).is_empty());
    }

    #[test]
    fn test_exit_without_entry_excluded() {
        // 조회 기간 이전에 진입한 포지션의 청산만 들어온 경우
        let deals = vec![deal(12, DealKind::Sell, DealEntry::Out, 100)];
        assert!(reconstruct(&deals).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(reconstruct(&[]).is_empty());
    }

    #[test]
    fn test_non_trade_and_unassigned_deals_skipped() {
        let deals = vec![
            deal(NO_POSITION, DealKind::Other, DealEntry::In, 50).with_profit(dec!(10000)),
            deal(NO_POSITION, DealKind::Buy, DealEntry::In, 60),
            deal(NO_POSITION, DealKind::Sell, DealEntry::Out, 70),
            deal(20, DealKind::Other, DealEntry::Out, 80).with_profit(dec!(999)),
            deal(20, DealKind::Sell, DealEntry::In, 100),
            deal(20, DealKind::Buy, DealEntry::Out, 200).with_profit(dec!(-5)),
        ];

        let trades = reconstruct(&deals);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].external_trade_id, "20");
        assert_eq!(trades[0].trade_type, TradeType::Sell);
        assert_eq!(trades[0].profit, dec!(-5));
        assert_eq!(trades[0].deal_count, 2);
    }

    #[test]
    fn test_unordered_input_sorted_by_time() {
        let deals = vec![
            deal(30, DealKind::Sell, DealEntry::Out, 300).with_fill(dec!(2), dec!(105)),
            deal(30, DealKind::Buy, DealEntry::In, 100).with_fill(dec!(2), dec!(100)),
        ];

        let trades = reconstruct(&deals);
        assert_eq!(trades[0].trade_type, TradeType::Buy);
        assert_eq!(trades[0].open_price, dec!(100));
        assert_eq!(trades[0].close_price, dec!(105));
        assert_eq!(trades[0].open_time, at(100));
    }

    #[test]
    fn test_time_ties_keep_input_order() {
        let deals = vec![
            deal(40, DealKind::Sell, DealEntry::In, 100).with_fill(dec!(1), dec!(10)),
            deal(40, DealKind::Buy, DealEntry::Out, 100).with_fill(dec!(1), dec!(11)),
        ];

        let trades = reconstruct(&deals);
        assert_eq!(trades[0].trade_type, TradeType::Sell);
        assert_eq!(trades[0].open_price, dec!(10));
        assert_eq!(trades[0].close_price, dec!(11));
    }

    #[test]
    fn test_partial_closes_are_summed() {
        let deals = vec![
            deal(50, DealKind::Buy, DealEntry::In, 100)
                .with_fill(dec!(3), dec!(1.2000))
                .with_costs(dec!(-3), dec!(0)),
            deal(50, DealKind::Sell, DealEntry::Out, 200)
                .with_fill(dec!(1), dec!(1.2100))
                .with_profit(dec!(10))
                .with_costs(dec!(-1), dec!(-0.5)),
            deal(50, DealKind::Buy, DealEntry::In, 250).with_fill(dec!(1), dec!(1.2050)),
            deal(50, DealKind::Sell, DealEntry::Out, 300)
                .with_fill(dec!(3), dec!(1.2200))
                .with_profit(dec!(45))
                .with_costs(dec!(-3), dec!(-1.25)),
        ];

        let trades = reconstruct(&deals);
        assert_eq!(trades.len(), 1);

        let trade = &trades[0];
        assert_eq!(trade.quantity, dec!(3));
        assert_eq!(trade.open_price, dec!(1.2000));
        assert_eq!(trade.close_price, dec!(1.2200));
        assert_eq!(trade.profit, dec!(55));
        assert_eq!(trade.commission, dec!(-7));
        assert_eq!(trade.swap, dec!(-1.75));
        assert_eq!(trade.deal_count, 4);
    }

    #[test]
    fn test_output_follows_first_appearance() {
        let deals = vec![
            deal(3, DealKind::Buy, DealEntry::In, 10),
            deal(1, DealKind::Buy, DealEntry::In, 20),
            deal(2, DealKind::Buy, DealEntry::In, 30),
            deal(1, DealKind::Sell, DealEntry::Out, 40),
            deal(2, DealKind::Sell, DealEntry::Out, 50),
            deal(3, DealKind::Sell, DealEntry::Out, 60),
        ];

        let ids: Vec<String> = reconstruct(&deals)
            .into_iter()
            .map(|trade| trade.external_trade_id)
            .collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_in_out_only_position_is_not_closed() {
        let deals = vec![
            deal(60, DealKind::Buy, DealEntry::InOut, 100),
            deal(60, DealKind::Sell, DealEntry::InOut, 200),
        ];
        assert!(reconstruct(&deals).is_empty());
    }

    #[test]
    fn test_overflowing_totals_skip_position() {
        let near_max = Decimal::MAX - dec!(1);
        let deals = vec![
            deal(70, DealKind::Buy, DealEntry::In, 100)
                .with_ticket(7001)
                .with_profit(near_max),
            deal(70, DealKind::Sell, DealEntry::Out, 200)
                .with_ticket(7002)
                .with_profit(near_max),
            deal(71, DealKind::Buy, DealEntry::In, 100),
            deal(71, DealKind::Sell, DealEntry::Out, 200).with_profit(dec!(5)),
        ];

        let trades = reconstruct(&deals);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].external_trade_id, "71");
        assert_eq!(trades[0].profit, dec!(5));
    }

    #[test]
    fn test_overflow_from_terminal_json() {
        let json = r#"[
            {"positionId": 1, "type": "buy", "entry": "in", "time": 1, "profit": 5e28},
            {"positionId": 1, "type": "sell", "entry": "out", "time": 2, "profit": 5e28}
        ]"#;
        let deals: Vec<Deal> = serde_json::from_str(json).unwrap();
        assert!(reconstruct(&deals).is_empty());
    }

    #[test]
    fn test_large_totals_within_range_are_kept() {
        let half = Decimal::MAX / dec!(2);
        let deals = vec![
            deal(80, DealKind::Buy, DealEntry::In, 100).with_costs(half, Decimal::ZERO),
            deal(80, DealKind::Sell, DealEntry::Out, 200).with_costs(-half, Decimal::ZERO),
        ];

        let trades = reconstruct(&deals);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].commission, Decimal::ZERO);
    }
}
