/// 상품 쿼리 상수들이 공유해야 하는 컬럼 목록 (테스트에서 일치 확인)
#[cfg(test)]
const PRODUCT_COLUMNS: &str = "id, title, description, starting_price, current_price, min_bid_increment, start_time, end_time, seller_id, status, created_at";

/// 상품 조회
pub const GET_AUCTION: &str = "SELECT id, title, description, starting_price, current_price, min_bid_increment, start_time, end_time, seller_id, status, created_at FROM products WHERE id = $1";

/// 모든 상품 조회
pub const GET_ALL_AUCTIONS: &str = "SELECT id, title, description, starting_price, current_price, min_bid_increment, start_time, end_time, seller_id, status, created_at FROM products ORDER BY created_at DESC";

/// 입찰 이력 조회 (최신순)
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, product_id, bidder_id, amount, created_at
    FROM bids
    WHERE product_id = $1
    ORDER BY created_at DESC
"#;

/// 낙찰 판정용 입찰 조회 (생성 순)
pub const GET_BIDS_ORDERED: &str = r#"
    SELECT id, product_id, bidder_id, amount, created_at
    FROM bids
    WHERE product_id = $1
    ORDER BY created_at ASC, id ASC
"#;

/// 상품 리뷰 조회
pub const GET_REVIEWS: &str = r#"
    SELECT id, product_id, reviewer_id, seller_id, rating, comment, created_at
    FROM reviews
    WHERE product_id = $1
    ORDER BY created_at DESC
"#;

// PRODUCT_COLUMNS는 쿼리 상수들이 같은 컬럼 목록을 쓰는지 테스트에서 확인하는 용도
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_queries_share_column_list() {
        assert!(GET_AUCTION.contains(PRODUCT_COLUMNS));
        assert!(GET_ALL_AUCTIONS.contains(PRODUCT_COLUMNS));
    }
}
