/// 사용자 프로필 통계와 신원 인증 기록
/// 통계 조회는 실패해도 기본값으로 내려간다. 프로필 화면이 저장소
/// 오류로 통째로 깨지는 것보다 빈 통계가 낫다는 명시적 선택이다.
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Models
/// 질의 시점에 계산되는 프로필 통계
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileStats {
    pub user_id: i64,
    pub auctions_listed: i64,
    pub auctions_sold: i64,
    pub auctions_won: i64,
    pub reviews_received: i64,
    pub average_rating: Option<f64>,
}

/// 신원 인증 기록. document_url은 외부 파일 저장소가 돌려준 참조값이다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IdentityVerification {
    pub id: i64,
    pub user_id: i64,
    pub document_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
// endregion: --- Models

// region:    --- SQL
const COUNT_LISTED: &str = "SELECT COUNT(*) FROM products WHERE seller_id = $1";

const COUNT_SOLD: &str =
    "SELECT COUNT(*) FROM products WHERE seller_id = $1 AND status = 'completed'";

// 낙찰 수: 마감된 경매에서 현재가와 같은 금액의 입찰을 가진 상품 수
const COUNT_WON: &str = r#"
    SELECT COUNT(DISTINCT p.id)
      FROM products p
      JOIN bids b ON b.product_id = p.id AND b.amount = p.current_price
     WHERE b.bidder_id = $1
       AND (p.status = 'completed' OR p.end_time <= now())
"#;

const RATING_SUMMARY: &str = r#"
    SELECT COUNT(*) AS review_count, AVG(rating)::FLOAT8 AS average_rating
      FROM reviews
     WHERE seller_id = $1
"#;

const INSERT_VERIFICATION: &str = r#"
    INSERT INTO identity_verifications (user_id, document_url, status, created_at)
    VALUES ($1, $2, 'submitted', $3)
    RETURNING id, user_id, document_url, status, created_at
"#;
// endregion: --- SQL

// region:    --- Queries
/// 프로필 통계 조회 (오류 시 기본값)
pub async fn get_profile_stats(db_manager: &DatabaseManager, user_id: i64) -> ProfileStats {
    info!("{:<12} --> 프로필 통계 조회 user_id: {}", "Profile", user_id);

    match load_stats(db_manager, user_id).await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(
                "{:<12} --> 프로필 통계 조회 실패, 기본값 반환: {:?}",
                "Profile", e
            );
            ProfileStats {
                user_id,
                ..ProfileStats::default()
            }
        }
    }
}

async fn load_stats(db_manager: &DatabaseManager, user_id: i64) -> Result<ProfileStats, AppError> {
    let pool = db_manager.pool();

    let auctions_listed = sqlx::query_scalar::<_, i64>(COUNT_LISTED)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let auctions_sold = sqlx::query_scalar::<_, i64>(COUNT_SOLD)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let auctions_won = sqlx::query_scalar::<_, i64>(COUNT_WON)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let rating_row = sqlx::query(RATING_SUMMARY)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let reviews_received: i64 = rating_row.get("review_count");
    let average_rating: Option<f64> = rating_row.get("average_rating");

    Ok(ProfileStats {
        user_id,
        auctions_listed,
        auctions_sold,
        auctions_won,
        reviews_received,
        average_rating,
    })
}
// endregion: --- Queries

// region:    --- Commands
/// 신원 인증 문서 제출 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitVerificationCommand {
    pub document_url: String,
}

/// 신원 인증 기록 생성
pub async fn handle_submit_verification(
    user_id: i64,
    cmd: SubmitVerificationCommand,
    db_manager: &DatabaseManager,
) -> Result<IdentityVerification, AppError> {
    info!(
        "{:<12} --> 신원 인증 제출: user_id={}",
        "Profile", user_id
    );

    if !cmd.document_url.starts_with("http://") && !cmd.document_url.starts_with("https://") {
        return Err(AppError::Validation(
            "문서 URL 형식이 올바르지 않습니다.".to_string(),
        ));
    }

    let verification = sqlx::query_as::<_, IdentityVerification>(INSERT_VERIFICATION)
        .bind(user_id)
        .bind(&cmd.document_url)
        .bind(Utc::now())
        .fetch_one(db_manager.pool())
        .await?;

    Ok(verification)
}
// endregion: --- Commands
