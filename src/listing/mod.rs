/// 상품 등록 커맨드 처리
// region:    --- Imports
use crate::auction::model::{Auction, STATUS_ACTIVE, STATUS_PENDING};
use crate::auction::state::MAX_BID_AMOUNT;
use crate::database::DatabaseManager;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- Commands
/// 상품 등록 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateAuctionCommand {
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub min_bid_increment: Option<Decimal>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

const INSERT_PRODUCT: &str = r#"
    INSERT INTO products (title, description, starting_price, current_price, min_bid_increment,
                          start_time, end_time, seller_id, status, created_at)
    VALUES ($1, $2, $3, $3, $4, $5, $6, $7, $8, $9)
    RETURNING id, title, description, starting_price, current_price, min_bid_increment,
              start_time, end_time, seller_id, status, created_at
"#;

/// 상품 등록
pub async fn handle_create_auction(
    seller_id: i64,
    cmd: CreateAuctionCommand,
    db_manager: &DatabaseManager,
) -> Result<Auction, AppError> {
    info!(
        "{:<12} --> 상품 등록 요청: seller_id={}, title={}",
        "Command", seller_id, cmd.title
    );

    if cmd.title.trim().is_empty() {
        return Err(AppError::Validation("제목은 비울 수 없습니다.".to_string()));
    }
    if cmd.starting_price <= Decimal::ZERO {
        return Err(AppError::Validation(
            "시작 가격은 0보다 커야 합니다.".to_string(),
        ));
    }
    if cmd.starting_price > MAX_BID_AMOUNT {
        return Err(AppError::AmountTooLarge);
    }
    if cmd.end_time <= cmd.start_time {
        return Err(AppError::Validation(
            "종료 시각은 시작 시각 이후여야 합니다.".to_string(),
        ));
    }
    if let Some(increment) = cmd.min_bid_increment {
        if increment <= Decimal::ZERO {
            return Err(AppError::Validation(
                "입찰 증가분은 0보다 커야 합니다.".to_string(),
            ));
        }
    }

    let now = Utc::now();
    // 시작 시각이 지났으면 바로 active로 등록한다
    let status = if cmd.start_time <= now {
        STATUS_ACTIVE
    } else {
        STATUS_PENDING
    };

    let auction = sqlx::query_as::<_, Auction>(INSERT_PRODUCT)
        .bind(&cmd.title)
        .bind(&cmd.description)
        .bind(cmd.starting_price)
        .bind(cmd.min_bid_increment)
        .bind(cmd.start_time)
        .bind(cmd.end_time)
        .bind(seller_id)
        .bind(status)
        .bind(now)
        .fetch_one(db_manager.pool())
        .await?;

    info!(
        "{:<12} --> 상품 등록 완료: id={}, status={}",
        "Command", auction.id, auction.status
    );
    Ok(auction)
}
// endregion: --- Commands
