/// 입찰 커맨드 처리
/// 검증과 가격 갱신이 분리되어 있으면 동시 입찰이 같은 현재가를 읽고
/// 둘 다 통과하는 유실 갱신이 생긴다. 그래서 수락 여부는 조건부 UPDATE
/// (현재가 비교-교환) 한 번으로 결정하고, 입찰 행 추가까지 같은
/// 트랜잭션에서 처리한다.
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::auction::model::{Auction, Bid, STATUS_COMPLETED};
use crate::auction::state::{validate_bid, MAX_BID_AMOUNT};
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::EventStore;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub amount: Decimal,
}

/// 수락된 입찰 응답
#[derive(Debug, Serialize)]
pub struct BidAccepted {
    pub bid: Bid,
    pub current_price: Decimal,
}

/// 조건부 가격 갱신. 모든 수락 조건이 WHERE 절에 들어 있어서
/// 동시 입찰 중 한 쪽만 통과한다.
const ACCEPT_BID: &str = r#"
    UPDATE products
       SET current_price = $1
     WHERE id = $2
       AND status != $4
       AND start_time <= $3
       AND end_time > $3
       AND current_price < $1
    RETURNING id, title, description, starting_price, current_price, min_bid_increment,
              start_time, end_time, seller_id, status, created_at
"#;

const INSERT_BID: &str = r#"
    INSERT INTO bids (product_id, bidder_id, amount, created_at)
    VALUES ($1, $2, $3, $4)
    RETURNING id, product_id, bidder_id, amount, created_at
"#;

const GET_PRODUCT: &str = r#"
    SELECT id, title, description, starting_price, current_price, min_bid_increment,
           start_time, end_time, seller_id, status, created_at
      FROM products
     WHERE id = $1
"#;

/// 입찰 처리
pub async fn handle_place_bid(
    product_id: i64,
    bidder_id: i64,
    cmd: PlaceBidCommand,
    db_manager: &DatabaseManager,
    event_store: &impl EventStore,
) -> Result<BidAccepted, AppError> {
    info!(
        "{:<12} --> 입찰 요청: product_id={}, bidder_id={}, amount={}",
        "Command", product_id, bidder_id, cmd.amount
    );

    // I/O 전에 걸러낼 수 있는 것들
    if cmd.amount > MAX_BID_AMOUNT {
        return Err(AppError::AmountTooLarge);
    }
    if cmd.amount <= Decimal::ZERO {
        return Err(AppError::Validation("입찰 금액은 0보다 커야 합니다.".to_string()));
    }

    let now = Utc::now();
    let pool = db_manager.pool();
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, Auction>(ACCEPT_BID)
        .bind(cmd.amount)
        .bind(product_id)
        .bind(now)
        .bind(STATUS_COMPLETED)
        .fetch_optional(&mut *tx)
        .await?;

    match updated {
        Some(auction) => {
            let bid = sqlx::query_as::<_, Bid>(INSERT_BID)
                .bind(product_id)
                .bind(bidder_id)
                .bind(cmd.amount)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;
            tx.commit().await?;

            event_store
                .append_and_publish(AuctionEvent::BidPlaced {
                    product_id,
                    bidder_id,
                    amount: cmd.amount,
                    current_price: auction.current_price,
                    timestamp: now,
                })
                .await?;

            info!(
                "{:<12} --> 입찰 수락: product_id={}, 현재가={}",
                "Command", product_id, auction.current_price
            );
            Ok(BidAccepted {
                bid,
                current_price: auction.current_price,
            })
        }
        None => {
            tx.rollback().await?;

            // 갱신이 거절된 이유를 읽기 전용으로 진단한다.
            // 가격은 단조 증가하므로 재조회 결과로 판정해도 어긋나지 않는다.
            let auction = sqlx::query_as::<_, Auction>(GET_PRODUCT)
                .bind(product_id)
                .fetch_optional(pool)
                .await?
                .ok_or(AppError::AuctionNotFound)?;

            let reason = validate_bid(&auction, cmd.amount, now)
                .err()
                .unwrap_or(AppError::BidTooLow {
                    current_price: auction.current_price,
                });
            info!(
                "{:<12} --> 입찰 거절: product_id={}, code={}",
                "Command",
                product_id,
                reason.code()
            );
            Err(reason)
        }
    }
}
// endregion: --- Commands
