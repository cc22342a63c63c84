/// 경매 수명주기 판정
/// 마감 여부, 낙찰자, 입찰 유효성 판정을 모두 이 모듈의 순수 함수로 모은다.
/// 결제/리뷰 게이트와 핸들러는 각자 판정을 다시 만들지 않고 여기에 위임한다.
// region:    --- Imports
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::model::{Auction, Bid, STATUS_COMPLETED};
use crate::error::AppError;
// endregion: --- Imports

// region:    --- Constants
/// 입찰 금액 상한 (99,999,999.99)
pub const MAX_BID_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);
// endregion: --- Constants

// region:    --- Auction State
/// 낙찰 입찰 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinningBid {
    pub bid_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl From<&Bid> for WinningBid {
    fn from(bid: &Bid) -> Self {
        WinningBid {
            bid_id: bid.id,
            bidder_id: bid.bidder_id,
            amount: bid.amount,
            placed_at: bid.created_at,
        }
    }
}

/// 특정 시점에 판정된 경매 상태
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuctionState {
    Open { suggested_next_bid: Decimal },
    Closed { winner: Option<WinningBid> },
}
// endregion: --- Auction State

// region:    --- Resolvers

/// 경매 시작 여부. 시작 시각 경과만 본다 (상태 컬럼은 스케줄러가 뒤따라 맞춘다).
pub fn has_started(auction: &Auction, now: DateTime<Utc>) -> bool {
    now >= auction.start_time
}

/// 경매 마감 여부. 종료 시각이 지났거나 저장된 상태가 completed이면 마감.
/// 시간은 흐르기만 하고 completed는 되돌리지 않으므로 단조 판정이다.
pub fn is_closed(auction: &Auction, now: DateTime<Utc>) -> bool {
    auction.status == STATUS_COMPLETED || now >= auction.end_time
}

/// 낙찰 입찰 선정: 금액이 현재가와 같은 입찰 중 가장 먼저 생성된 것.
/// 동시 입찰 레이스로 같은 금액이 남아 있는 과거 데이터를 위해
/// 생성 시각, 그 다음 id 순으로 타이브레이크한다.
pub fn resolve_winner<'a>(auction: &Auction, bids: &'a [Bid]) -> Option<&'a Bid> {
    bids.iter()
        .filter(|b| b.amount == auction.current_price)
        .min_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
}

/// 경매 상태 판정의 단일 진입점
pub fn resolve_auction_state(auction: &Auction, bids: &[Bid], now: DateTime<Utc>) -> AuctionState {
    if !is_closed(auction, now) {
        return AuctionState::Open {
            suggested_next_bid: auction.suggested_next_bid(),
        };
    }
    AuctionState::Closed {
        winner: resolve_winner(auction, bids).map(WinningBid::from),
    }
}

/// 입찰 유효성 검증
/// 수락 자체는 DB의 조건부 갱신이 결정하고, 이 함수는 사전 검증과
/// 갱신 실패 시 거절 사유 진단에 쓰인다.
pub fn validate_bid(auction: &Auction, amount: Decimal, now: DateTime<Utc>) -> Result<(), AppError> {
    if amount > MAX_BID_AMOUNT {
        return Err(AppError::AmountTooLarge);
    }
    if !has_started(auction, now) {
        return Err(AppError::AuctionNotStarted);
    }
    if is_closed(auction, now) {
        return Err(AppError::AuctionEnded);
    }
    // 아직 입찰이 없는 경매에서 시작가 미만 금액은 별도 코드로 거절
    if auction.current_price == auction.starting_price && amount < auction.starting_price {
        return Err(AppError::BelowStartingPrice {
            starting_price: auction.starting_price,
        });
    }
    if amount <= auction.current_price {
        return Err(AppError::BidTooLow {
            current_price: auction.current_price,
        });
    }
    Ok(())
}
// endregion: --- Resolvers

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{STATUS_ACTIVE, STATUS_PENDING};
    use chrono::Duration;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value * 100, 2)
    }

    fn test_auction(now: DateTime<Utc>) -> Auction {
        Auction {
            id: 1,
            title: "시계".to_string(),
            description: "빈티지 손목시계".to_string(),
            starting_price: dec(100),
            current_price: dec(100),
            min_bid_increment: None,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            seller_id: 7,
            status: STATUS_ACTIVE.to_string(),
            created_at: now - Duration::hours(2),
        }
    }

    fn test_bid(id: i64, bidder_id: i64, amount: Decimal, at: DateTime<Utc>) -> Bid {
        Bid {
            id,
            product_id: 1,
            bidder_id,
            amount,
            created_at: at,
        }
    }

    #[test]
    fn max_bid_amount_is_ceiling() {
        assert_eq!(MAX_BID_AMOUNT, Decimal::new(9_999_999_999, 2));
    }

    #[test]
    fn bid_over_ceiling_rejected_regardless_of_price() {
        let now = Utc::now();
        let auction = test_auction(now);
        let result = validate_bid(&auction, MAX_BID_AMOUNT + Decimal::new(1, 2), now);
        assert!(matches!(result, Err(AppError::AmountTooLarge)));
    }

    #[test]
    fn bid_at_or_below_current_price_rejected() {
        let now = Utc::now();
        let mut auction = test_auction(now);
        auction.current_price = dec(120);

        assert!(matches!(
            validate_bid(&auction, dec(120), now),
            Err(AppError::BidTooLow { .. })
        ));
        assert!(matches!(
            validate_bid(&auction, dec(110), now),
            Err(AppError::BidTooLow { .. })
        ));
        assert!(validate_bid(&auction, dec(121), now).is_ok());
    }

    #[test]
    fn first_bid_below_starting_price_rejected_with_specific_code() {
        let now = Utc::now();
        let auction = test_auction(now);
        assert!(matches!(
            validate_bid(&auction, dec(90), now),
            Err(AppError::BelowStartingPrice { .. })
        ));
        // 시작가와 같은 금액은 현재가를 넘지 못하므로 BID_TOO_LOW
        assert!(matches!(
            validate_bid(&auction, dec(100), now),
            Err(AppError::BidTooLow { .. })
        ));
    }

    #[test]
    fn bid_before_start_or_after_end_rejected() {
        let now = Utc::now();
        let mut auction = test_auction(now);
        auction.start_time = now + Duration::minutes(10);
        assert!(matches!(
            validate_bid(&auction, dec(150), now),
            Err(AppError::AuctionNotStarted)
        ));

        let mut auction = test_auction(now);
        auction.end_time = now - Duration::minutes(1);
        assert!(matches!(
            validate_bid(&auction, dec(150), now),
            Err(AppError::AuctionEnded)
        ));
    }

    #[test]
    fn closed_iff_end_time_passed_or_status_completed() {
        let now = Utc::now();
        let auction = test_auction(now);
        assert!(!is_closed(&auction, now));
        assert!(is_closed(&auction, auction.end_time));
        assert!(is_closed(&auction, auction.end_time + Duration::hours(5)));

        let mut completed = test_auction(now);
        completed.status = STATUS_COMPLETED.to_string();
        assert!(is_closed(&completed, now));
    }

    #[test]
    fn pending_auction_starts_by_time_not_status() {
        let now = Utc::now();
        let mut auction = test_auction(now);
        auction.status = STATUS_PENDING.to_string();
        // 스케줄러가 아직 상태를 못 바꿨어도 시작 시각이 지났으면 시작된 것
        assert!(has_started(&auction, now));
        assert!(!has_started(&auction, auction.start_time - Duration::seconds(1)));
    }

    #[test]
    fn winner_undefined_while_open() {
        let now = Utc::now();
        let mut auction = test_auction(now);
        auction.current_price = dec(120);
        let bids = vec![test_bid(1, 10, dec(120), now)];

        let state = resolve_auction_state(&auction, &bids, now);
        assert!(matches!(state, AuctionState::Open { .. }));
    }

    #[test]
    fn winner_is_bid_matching_current_price() {
        let now = Utc::now();
        let mut auction = test_auction(now);
        auction.current_price = dec(150);
        let bids = vec![
            test_bid(1, 10, dec(120), now - Duration::minutes(30)),
            test_bid(2, 11, dec(150), now - Duration::minutes(10)),
        ];

        let state = resolve_auction_state(&auction, &bids, auction.end_time);
        match state {
            AuctionState::Closed { winner: Some(w) } => {
                assert_eq!(w.bidder_id, 11);
                assert_eq!(w.amount, dec(150));
            }
            other => panic!("예상과 다른 상태: {:?}", other),
        }
    }

    #[test]
    fn winner_tie_break_is_earliest_created() {
        let now = Utc::now();
        let mut auction = test_auction(now);
        auction.current_price = dec(150);
        // 레이스로 남은 동일 금액 입찰: 먼저 생성된 쪽이 낙찰
        let bids = vec![
            test_bid(2, 11, dec(150), now - Duration::minutes(5)),
            test_bid(1, 10, dec(150), now - Duration::minutes(10)),
        ];

        let winner = resolve_winner(&auction, &bids).map(|b| b.bidder_id);
        assert_eq!(winner, Some(10));
    }

    #[test]
    fn no_bids_means_no_winner() {
        let now = Utc::now();
        let auction = test_auction(now);
        let state = resolve_auction_state(&auction, &[], auction.end_time);
        assert_eq!(state, AuctionState::Closed { winner: None });
    }

    #[test]
    fn suggested_next_bid_defaults_to_ten_percent_of_starting_price() {
        let now = Utc::now();
        let mut auction = test_auction(now);
        assert_eq!(auction.suggested_next_bid(), dec(110));

        auction.min_bid_increment = Some(dec(25));
        auction.current_price = dec(200);
        assert_eq!(auction.suggested_next_bid(), dec(225));
    }

    #[test]
    fn accepted_bids_keep_price_strictly_increasing() {
        let now = Utc::now();
        let mut auction = test_auction(now);
        let mut bids = Vec::new();

        // A가 120 입찰 -> 수락
        assert!(validate_bid(&auction, dec(120), now).is_ok());
        auction.current_price = dec(120);
        bids.push(test_bid(1, 1, dec(120), now));

        // B가 110 입찰 -> 거절, 현재가 유지
        assert!(matches!(
            validate_bid(&auction, dec(110), now),
            Err(AppError::BidTooLow { .. })
        ));
        assert_eq!(auction.current_price, dec(120));

        // 종료 후 낙찰자는 A
        let state = resolve_auction_state(&auction, &bids, auction.end_time);
        match state {
            AuctionState::Closed { winner: Some(w) } => assert_eq!(w.bidder_id, 1),
            other => panic!("예상과 다른 상태: {:?}", other),
        }
    }
}
// endregion: --- Tests
