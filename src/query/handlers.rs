// region:    --- Imports
use super::queries;
use crate::auction::model::{Auction, Bid, Review};
use crate::auction::state::{resolve_auction_state, AuctionState};
use crate::database::DatabaseManager;
use crate::error::AppError;
use chrono::Utc;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 상품 조회
pub async fn get_auction(
    db_manager: &DatabaseManager,
    product_id: i64,
) -> Result<Auction, AppError> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", product_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
                    .bind(product_id)
                    .fetch_optional(&mut **tx)
                    .await
                    .map_err(AppError::from)?
                    .ok_or(AppError::AuctionNotFound)
            })
        })
        .await
}

/// 모든 상품 조회
pub async fn get_all_auctions(db_manager: &DatabaseManager) -> Result<Vec<Auction>, AppError> {
    info!("{:<12} --> 모든 상품 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::GET_ALL_AUCTIONS)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(AppError::from)
            })
        })
        .await
}

/// 입찰 이력 조회 (최신순)
pub async fn get_bid_history(
    db_manager: &DatabaseManager,
    product_id: i64,
) -> Result<Vec<Bid>, AppError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", product_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
                    .bind(product_id)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(AppError::from)
            })
        })
        .await
}

/// 낙찰 판정용 입찰 조회 (생성 순)
pub async fn get_bids_ordered(
    db_manager: &DatabaseManager,
    product_id: i64,
) -> Result<Vec<Bid>, AppError> {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Bid>(queries::GET_BIDS_ORDERED)
                    .bind(product_id)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(AppError::from)
            })
        })
        .await
}

/// 경매 상태 판정 조회 (열림/마감 + 낙찰자)
pub async fn get_auction_state(
    db_manager: &DatabaseManager,
    product_id: i64,
) -> Result<AuctionState, AppError> {
    info!("{:<12} --> 경매 상태 판정 id: {}", "Query", product_id);
    let auction = get_auction(db_manager, product_id).await?;
    let bids = get_bids_ordered(db_manager, product_id).await?;
    Ok(resolve_auction_state(&auction, &bids, Utc::now()))
}

/// 상품 리뷰 조회
pub async fn get_reviews(
    db_manager: &DatabaseManager,
    product_id: i64,
) -> Result<Vec<Review>, AppError> {
    info!("{:<12} --> 리뷰 조회 id: {}", "Query", product_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Review>(queries::GET_REVIEWS)
                    .bind(product_id)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(AppError::from)
            })
        })
        .await
}

// endregion: --- Query Handlers
