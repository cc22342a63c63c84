use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 외부 변경 알림 채널로 발행되는 도메인 이벤트
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum AuctionEvent {
    // 입찰 수락 (현재가 갱신 포함)
    BidPlaced {
        product_id: i64,
        bidder_id: i64,
        amount: Decimal,
        current_price: Decimal,
        timestamp: DateTime<Utc>,
    },
    // 종료 시각 경과로 경매 마감
    AuctionCompleted {
        product_id: i64,
        timestamp: DateTime<Utc>,
    },
    // 낙찰자 결제 완료
    PaymentCompleted {
        product_id: i64,
        payer_id: i64,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    },
    // 낙찰자 리뷰 작성
    ReviewSubmitted {
        product_id: i64,
        reviewer_id: i64,
        rating: i16,
        timestamp: DateTime<Utc>,
    },
}

impl AuctionEvent {
    /// 이벤트 타입 이름 (이벤트 로그의 event_type 컬럼 값)
    pub fn kind(&self) -> &'static str {
        match self {
            AuctionEvent::BidPlaced { .. } => "BidPlaced",
            AuctionEvent::AuctionCompleted { .. } => "AuctionCompleted",
            AuctionEvent::PaymentCompleted { .. } => "PaymentCompleted",
            AuctionEvent::ReviewSubmitted { .. } => "ReviewSubmitted",
        }
    }

    /// 이벤트가 속한 경매 id
    pub fn product_id(&self) -> i64 {
        match self {
            AuctionEvent::BidPlaced { product_id, .. }
            | AuctionEvent::AuctionCompleted { product_id, .. }
            | AuctionEvent::PaymentCompleted { product_id, .. }
            | AuctionEvent::ReviewSubmitted { product_id, .. } => *product_id,
        }
    }
}
