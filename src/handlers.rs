// region:    --- Imports
use crate::auth::AuthUser;
use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::PostgresEventStore;
use crate::feed::{BidFeed, LiveAuction};
use crate::listing::{handle_create_auction, CreateAuctionCommand};
use crate::message_broker::KafkaProducer;
use crate::profile::{
    get_profile_stats, handle_submit_verification, SubmitVerificationCommand,
};
use crate::query;
use crate::settlement::commands::{
    handle_initiate_payment, handle_submit_review, SubmitReviewCommand,
};
use crate::settlement::provider::PaymentProvider;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

// endregion: --- Imports

// region:    --- App State
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub producer: Arc<KafkaProducer>,
    pub feed: Arc<BidFeed>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl AppState {
    fn event_store(&self) -> PostgresEventStore {
        PostgresEventStore::new(self.db.get_pool(), Arc::clone(&self.producer))
    }
}
// endregion: --- App State

// region:    --- Command Handlers

/// 상품 등록
pub async fn create_auction(
    State(state): State<AppState>,
    user: AuthUser,
    Json(cmd): Json<CreateAuctionCommand>,
) -> Result<impl IntoResponse, AppError> {
    let auction = handle_create_auction(user.user_id, cmd, &state.db).await?;
    Ok((StatusCode::CREATED, Json(auction)))
}

/// 입찰
pub async fn place_bid(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    user: AuthUser,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<impl IntoResponse, AppError> {
    let event_store = state.event_store();
    let accepted =
        handle_place_bid(product_id, user.user_id, cmd, &state.db, &event_store).await?;
    Ok((StatusCode::CREATED, Json(accepted)))
}

/// 결제 (낙찰자 전용)
pub async fn initiate_payment(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let event_store = state.event_store();
    let payment = handle_initiate_payment(
        product_id,
        user.user_id,
        &state.db,
        &event_store,
        state.payments.as_ref(),
    )
    .await?;
    Ok(Json(payment))
}

/// 리뷰 작성 (낙찰자 전용, 경매당 1회)
pub async fn submit_review(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    user: AuthUser,
    Json(cmd): Json<SubmitReviewCommand>,
) -> Result<impl IntoResponse, AppError> {
    let event_store = state.event_store();
    let review =
        handle_submit_review(product_id, user.user_id, cmd, &state.db, &event_store).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// 신원 인증 문서 제출
pub async fn submit_verification(
    State(state): State<AppState>,
    user: AuthUser,
    Json(cmd): Json<SubmitVerificationCommand>,
) -> Result<impl IntoResponse, AppError> {
    let verification = handle_submit_verification(user.user_id, cmd, &state.db).await?;
    Ok((StatusCode::CREATED, Json(verification)))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 모든 상품 조회
pub async fn get_auctions(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let auctions = query::handlers::get_all_auctions(&state.db).await?;
    Ok(Json(auctions))
}

/// 상품 조회
pub async fn get_auction(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let auction = query::handlers::get_auction(&state.db, product_id).await?;
    Ok(Json(auction))
}

/// 입찰 이력 조회
pub async fn get_auction_bids(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let bids = query::handlers::get_bid_history(&state.db, product_id).await?;
    Ok(Json(bids))
}

/// 경매 상태 판정 조회
pub async fn get_auction_state(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let resolved = query::handlers::get_auction_state(&state.db, product_id).await?;
    Ok(Json(resolved))
}

/// 리뷰 조회
pub async fn get_auction_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let reviews = query::handlers::get_reviews(&state.db, product_id).await?;
    Ok(Json(reviews))
}

/// 라이브 스냅샷 조회
/// 아직 이벤트를 받은 적 없는 경매는 저장소 상태로 초기 스냅샷을 만든다.
pub async fn get_auction_live(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(live) = state.feed.snapshot(product_id) {
        return Ok(Json(live));
    }

    let auction = query::handlers::get_auction(&state.db, product_id).await?;
    let bids = query::handlers::get_bid_history(&state.db, product_id).await?;
    let now = Utc::now();
    Ok(Json(LiveAuction {
        product_id: auction.id,
        current_price: Some(auction.current_price),
        last_bidder_id: bids.first().map(|b| b.bidder_id),
        bid_count: bids.len() as u64,
        completed: crate::auction::state::is_closed(&auction, now),
        updated_at: now,
    }))
}

/// 프로필 통계 조회
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let stats = get_profile_stats(&state.db, user_id).await;
    Ok(Json(stats))
}

// endregion: --- Query Handlers
