// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use thiserror::Error;
// endregion: --- Imports

// region:    --- App Error
/// 서비스 전역 에러 타입
/// 핸들러는 이 타입을 그대로 반환하고, IntoResponse 구현이
/// {"error": 메시지, "code": 코드} 형태의 JSON 응답으로 변환한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("잘못된 요청입니다: {0}")]
    Validation(String),

    #[error("인증 정보가 없습니다.")]
    Unauthorized,

    #[error("경매를 찾을 수 없습니다.")]
    AuctionNotFound,

    #[error("경매가 아직 시작되지 않았습니다.")]
    AuctionNotStarted,

    #[error("경매가 이미 종료되었습니다.")]
    AuctionEnded,

    #[error("입찰 금액이 현재 가격보다 높아야 합니다.")]
    BidTooLow { current_price: Decimal },

    #[error("입찰 금액이 시작 가격보다 낮습니다.")]
    BelowStartingPrice { starting_price: Decimal },

    #[error("입찰 금액이 허용 상한을 초과했습니다.")]
    AmountTooLarge,

    #[error("경매가 아직 종료되지 않았습니다.")]
    AuctionNotClosed,

    #[error("낙찰자가 아닙니다.")]
    NotWinner,

    #[error("이미 리뷰를 작성했습니다.")]
    AlreadyReviewed,

    #[error("저장소 오류: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("메시지 브로커 오류: {0}")]
    Broker(String),

    #[error("결제 처리 오류: {0}")]
    Payment(String),
}

impl AppError {
    /// 클라이언트가 분기할 수 있는 고정 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::AuctionNotFound => "AUCTION_NOT_FOUND",
            AppError::AuctionNotStarted => "NOT_STARTED",
            AppError::AuctionEnded => "ALREADY_ENDED",
            AppError::BidTooLow { .. } => "BID_TOO_LOW",
            AppError::BelowStartingPrice { .. } => "BELOW_STARTING_PRICE",
            AppError::AmountTooLarge => "AMOUNT_TOO_LARGE",
            AppError::AuctionNotClosed => "AUCTION_NOT_CLOSED",
            AppError::NotWinner => "NOT_WINNER",
            AppError::AlreadyReviewed => "ALREADY_REVIEWED",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Broker(_) => "BROKER_ERROR",
            AppError::Payment(_) => "PAYMENT_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::AuctionNotStarted
            | AppError::AuctionEnded
            | AppError::BidTooLow { .. }
            | AppError::BelowStartingPrice { .. }
            | AppError::AmountTooLarge
            | AppError::AuctionNotClosed => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotWinner => StatusCode::FORBIDDEN,
            AppError::AuctionNotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyReviewed => StatusCode::CONFLICT,
            AppError::Storage(_) | AppError::Broker(_) | AppError::Payment(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });

        // 입찰 거절 시 기준 가격을 함께 내려준다
        match &self {
            AppError::BidTooLow { current_price } => {
                body["current_price"] = serde_json::json!(current_price);
            }
            AppError::BelowStartingPrice { starting_price } => {
                body["starting_price"] = serde_json::json!(starting_price);
            }
            _ => {}
        }

        (self.status(), Json(body)).into_response()
    }
}
// endregion: --- App Error

// endregion: --- Tests
