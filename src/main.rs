// region:    --- Imports
use crate::database::DatabaseManager;
use crate::event_store::PostgresEventStore;
use crate::feed::BidFeed;
use crate::handlers::AppState;
use crate::message_broker::{KafkaManager, AUCTION_EVENTS_TOPIC};
use crate::settlement::provider::StubPaymentProvider;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod auction;
mod auth;
mod bidding;
mod database;
mod error;
mod event_store;
mod feed;
mod handlers;
mod listing;
mod message_broker;
mod profile;
mod query;
mod scheduler;
mod settlement;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new().await);

    // 스키마 초기화 (AUCTION_DB_RESET=1이면 테이블 재생성)
    let reset = std::env::var("AUCTION_DB_RESET").map(|v| v == "1").unwrap_or(false);
    if let Err(e) = db_manager.initialize_database(reset).await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // Kafka 매니저 생성 및 초기화
    let kafka_manager = Arc::new(KafkaManager::new());
    if let Err(e) = kafka_manager.initialize().await {
        error!("{:<12} --> Kafka 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> Kafka 초기화 성공", "Main");

    // 변경 알림 토픽 생성
    kafka_manager
        .create_topic(AUCTION_EVENTS_TOPIC, 5, 1)
        .await?;

    // 실시간 입찰 피드 시작
    let bid_feed = BidFeed::new();
    bid_feed.start(kafka_manager.get_consumer());

    // 경매 상태 수렴 스케줄러 시작
    let event_store = Arc::new(PostgresEventStore::new(
        db_manager.get_pool(),
        kafka_manager.get_producer(),
    ));
    let scheduler = scheduler::AuctionScheduler::new(db_manager.get_pool(), event_store);
    scheduler.start().await;

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        db: Arc::clone(&db_manager),
        producer: kafka_manager.get_producer(),
        feed: bid_feed,
        payments: Arc::new(StubPaymentProvider::new()),
    };

    // 라우터 설정
    let routes_all = Router::new()
        .route(
            "/auctions",
            get(handlers::get_auctions).post(handlers::create_auction),
        )
        .route("/auctions/:id", get(handlers::get_auction))
        .route(
            "/auctions/:id/bids",
            get(handlers::get_auction_bids).post(handlers::place_bid),
        )
        .route("/auctions/:id/state", get(handlers::get_auction_state))
        .route("/auctions/:id/live", get(handlers::get_auction_live))
        .route("/auctions/:id/payment", post(handlers::initiate_payment))
        .route(
            "/auctions/:id/reviews",
            get(handlers::get_auction_reviews).post(handlers::submit_review),
        )
        .route("/profiles/:user_id", get(handlers::get_profile))
        .route("/verifications", post(handlers::submit_verification))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 20))
        .with_state(state);

    // 리스너 생성
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
