/// 결제/리뷰 게이트
/// 두 게이트 모두 마감 여부와 낙찰자 판정을 auction::state의 단일
/// 판정 함수에 위임한다. 중복 생성 방지는 체크 후 삽입이 아니라
/// 유니크 제약 + ON CONFLICT로 처리한다.
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::auction::model::{Payment, Review, PAYMENT_COMPLETED};
use crate::auction::state::{resolve_auction_state, AuctionState, WinningBid};
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::EventStore;
use crate::query;
use crate::settlement::provider::{PaymentIntent, PaymentProvider};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- SQL
const INSERT_PAYMENT: &str = r#"
    INSERT INTO payments (product_id, payer_id, status, intent_token, created_at)
    VALUES ($1, $2, 'pending', $3, $4)
    ON CONFLICT (product_id, payer_id) DO NOTHING
    RETURNING id, product_id, payer_id, status, intent_token, created_at, completed_at
"#;

const GET_PAYMENT: &str = r#"
    SELECT id, product_id, payer_id, status, intent_token, created_at, completed_at
      FROM payments
     WHERE product_id = $1 AND payer_id = $2
"#;

const COMPLETE_PAYMENT: &str = r#"
    UPDATE payments
       SET status = 'completed', completed_at = $1
     WHERE id = $2
    RETURNING id, product_id, payer_id, status, intent_token, created_at, completed_at
"#;

const INSERT_REVIEW: &str = r#"
    INSERT INTO reviews (product_id, reviewer_id, seller_id, rating, comment, created_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (product_id, reviewer_id) DO NOTHING
    RETURNING id, product_id, reviewer_id, seller_id, rating, comment, created_at
"#;
// endregion: --- SQL

// region:    --- Winner Gate
/// 마감된 경매의 낙찰자만 통과시키는 공통 게이트
async fn require_winner(
    db_manager: &DatabaseManager,
    product_id: i64,
    user_id: i64,
) -> Result<(crate::auction::model::Auction, WinningBid), AppError> {
    let auction = query::handlers::get_auction(db_manager, product_id).await?;
    let bids = query::handlers::get_bids_ordered(db_manager, product_id).await?;

    match resolve_auction_state(&auction, &bids, Utc::now()) {
        AuctionState::Open { .. } => Err(AppError::AuctionNotClosed),
        AuctionState::Closed { winner } => {
            let winner = winner.ok_or(AppError::NotWinner)?;
            if winner.bidder_id != user_id {
                return Err(AppError::NotWinner);
            }
            Ok((auction, winner))
        }
    }
}
// endregion: --- Winner Gate

// region:    --- Payment Command
/// 결제 처리: 낙찰자 확인 -> 결제 행 생성(또는 재사용) -> 제공자 확정
pub async fn handle_initiate_payment(
    product_id: i64,
    payer_id: i64,
    db_manager: &DatabaseManager,
    event_store: &impl EventStore,
    provider: &dyn PaymentProvider,
) -> Result<Payment, AppError> {
    info!(
        "{:<12} --> 결제 요청: product_id={}, payer_id={}",
        "Command", product_id, payer_id
    );

    let (_auction, winner) = require_winner(db_manager, product_id, payer_id).await?;

    let intent = provider
        .create_intent(product_id, payer_id, winner.amount)
        .await?;

    // 유니크 제약 덕에 동시 요청이 와도 결제 행은 하나만 생긴다
    let pool = db_manager.pool();
    let inserted = sqlx::query_as::<_, Payment>(INSERT_PAYMENT)
        .bind(product_id)
        .bind(payer_id)
        .bind(&intent.token)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

    let payment = match inserted {
        Some(payment) => payment,
        None => {
            // 이미 행이 있으면 재사용한다
            let existing = sqlx::query_as::<_, Payment>(GET_PAYMENT)
                .bind(product_id)
                .bind(payer_id)
                .fetch_one(pool)
                .await?;
            if existing.status == PAYMENT_COMPLETED {
                info!(
                    "{:<12} --> 이미 완료된 결제 재사용: id={}",
                    "Command", existing.id
                );
                return Ok(existing);
            }
            existing
        }
    };

    provider
        .confirm(&PaymentIntent {
            token: payment.intent_token.clone(),
        })
        .await?;

    let completed = sqlx::query_as::<_, Payment>(COMPLETE_PAYMENT)
        .bind(Utc::now())
        .bind(payment.id)
        .fetch_one(pool)
        .await?;

    event_store
        .append_and_publish(AuctionEvent::PaymentCompleted {
            product_id,
            payer_id,
            amount: winner.amount,
            timestamp: Utc::now(),
        })
        .await?;

    info!(
        "{:<12} --> 결제 완료: product_id={}, payment_id={}",
        "Command", product_id, completed.id
    );
    Ok(completed)
}
// endregion: --- Payment Command

// region:    --- Review Command
/// 리뷰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitReviewCommand {
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

/// 리뷰 작성: 낙찰자 확인 -> 삽입 시도. 이미 있으면 AlreadyReviewed.
pub async fn handle_submit_review(
    product_id: i64,
    reviewer_id: i64,
    cmd: SubmitReviewCommand,
    db_manager: &DatabaseManager,
    event_store: &impl EventStore,
) -> Result<Review, AppError> {
    info!(
        "{:<12} --> 리뷰 요청: product_id={}, reviewer_id={}, rating={}",
        "Command", product_id, reviewer_id, cmd.rating
    );

    if !(1..=5).contains(&cmd.rating) {
        return Err(AppError::Validation(
            "평점은 1에서 5 사이여야 합니다.".to_string(),
        ));
    }

    let (auction, _winner) = require_winner(db_manager, product_id, reviewer_id).await?;

    let review = sqlx::query_as::<_, Review>(INSERT_REVIEW)
        .bind(product_id)
        .bind(reviewer_id)
        .bind(auction.seller_id)
        .bind(cmd.rating)
        .bind(&cmd.comment)
        .bind(Utc::now())
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or(AppError::AlreadyReviewed)?;

    event_store
        .append_and_publish(AuctionEvent::ReviewSubmitted {
            product_id,
            reviewer_id,
            rating: cmd.rating,
            timestamp: Utc::now(),
        })
        .await?;

    info!(
        "{:<12} --> 리뷰 작성 완료: product_id={}, review_id={}",
        "Command", product_id, review.id
    );
    Ok(review)
}
// endregion: --- Review Command
