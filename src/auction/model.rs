use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// 경매 상태 값 (products.status 컬럼)
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";

// 결제 상태 값 (payments.status 컬럼)
pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_COMPLETED: &str = "completed";

// 경매 상품 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub current_price: Decimal,
    pub min_bid_increment: Option<Decimal>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub seller_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// 입찰 증가분. 미지정 시 시작가의 10%를 사용한다.
    pub fn increment(&self) -> Decimal {
        self.min_bid_increment
            .unwrap_or(self.starting_price * Decimal::new(1, 1))
    }

    /// 다음 입찰 권장 금액 (현재가 + 증가분)
    pub fn suggested_next_bid(&self) -> Decimal {
        self.current_price + self.increment()
    }
}

// 입찰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub product_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

// 결제 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: i64,
    pub product_id: i64,
    pub payer_id: i64,
    pub status: String,
    pub intent_token: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// 리뷰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub reviewer_id: i64,
    pub seller_id: i64,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
