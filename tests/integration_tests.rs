//! HTTP 통합 테스트
//! 로컬에서 서비스(기본 0.0.0.0:3000)와 PostgreSQL, Kafka가 떠 있어야
//! 동작하므로 기본 실행에서는 제외한다: cargo test -- --ignored

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000";

/// 사용자 신원 헤더를 붙인 클라이언트 요청
fn with_user(builder: reqwest::RequestBuilder, user_id: i64) -> reqwest::RequestBuilder {
    builder
        .header("x-user-id", user_id.to_string())
        .header("x-user-email", format!("user{}@example.com", user_id))
}

/// 테스트용 경매 생성. 반환값은 생성된 경매 JSON.
async fn create_test_auction(client: &Client, seller_id: i64, lifetime_secs: i64) -> Value {
    let body = json!({
        "title": "통합 테스트 상품",
        "description": "통합 테스트를 위한 상품입니다.",
        "starting_price": 100,
        "start_time": Utc::now(),
        "end_time": Utc::now() + Duration::seconds(lifetime_secs),
    });

    let response = with_user(client.post(format!("{}/auctions", BASE_URL)), seller_id)
        .json(&body)
        .send()
        .await
        .expect("상품 등록 요청 실패");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("상품 JSON 파싱 실패")
}

/// 입찰 요청 전송
async fn place_bid(client: &Client, auction_id: i64, bidder_id: i64, amount: i64) -> (StatusCode, Value) {
    let response = with_user(
        client.post(format!("{}/auctions/{}/bids", BASE_URL, auction_id)),
        bidder_id,
    )
    .json(&json!({ "amount": amount }))
    .send()
    .await
    .expect("입찰 요청 실패");

    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// 입찰 수락/거절 규칙 테스트
#[tokio::test]
#[ignore = "로컬 서비스, PostgreSQL, Kafka 필요"]
async fn test_bid_validation_rules() {
    let client = Client::new();
    let auction = create_test_auction(&client, 100, 3600).await;
    let auction_id = auction["id"].as_i64().unwrap();

    // 시작가 미만 -> BELOW_STARTING_PRICE
    let (status, body) = place_bid(&client, auction_id, 1, 50).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BELOW_STARTING_PRICE");

    // 첫 유효 입찰 수락
    let (status, body) = place_bid(&client, auction_id, 1, 120).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["bid"]["bidder_id"].as_i64(), Some(1));

    // 현재가 이하 -> BID_TOO_LOW
    let (status, body) = place_bid(&client, auction_id, 2, 110).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BID_TOO_LOW");

    // 상한 초과 -> AMOUNT_TOO_LARGE
    let (status, body) = place_bid(&client, auction_id, 2, 100_000_000).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "AMOUNT_TOO_LARGE");
}

/// 경매 수명주기 시나리오: 입찰 -> 마감 -> 낙찰자 결제 -> 리뷰 1회
#[tokio::test]
#[ignore = "로컬 서비스, PostgreSQL, Kafka 필요"]
async fn test_auction_lifecycle_end_to_end() {
    let client = Client::new();
    let auction = create_test_auction(&client, 100, 5).await;
    let auction_id = auction["id"].as_i64().unwrap();

    // A(1)가 120 입찰 -> 수락
    let (status, _) = place_bid(&client, auction_id, 1, 120).await;
    assert_eq!(status, StatusCode::CREATED);

    // B(2)가 110 입찰 -> 거절
    let (status, body) = place_bid(&client, auction_id, 2, 110).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BID_TOO_LOW");

    // 마감 전 결제 시도 -> AUCTION_NOT_CLOSED
    let response = with_user(
        client.post(format!("{}/auctions/{}/payment", BASE_URL, auction_id)),
        1,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 경매 종료 대기
    tokio::time::sleep(tokio::time::Duration::from_secs(7)).await;

    // 낙찰자 판정 확인
    let state: Value = client
        .get(format!("{}/auctions/{}/state", BASE_URL, auction_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["state"], "closed");
    assert_eq!(state["winner"]["bidder_id"].as_i64(), Some(1));

    // B의 결제 시도 -> NOT_WINNER
    let response = with_user(
        client.post(format!("{}/auctions/{}/payment", BASE_URL, auction_id)),
        2,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A의 결제 -> completed
    let response = with_user(
        client.post(format!("{}/auctions/{}/payment", BASE_URL, auction_id)),
        1,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payment: Value = response.json().await.unwrap();
    assert_eq!(payment["status"], "completed");

    // 결제 재시도는 같은 결제를 재사용
    let response = with_user(
        client.post(format!("{}/auctions/{}/payment", BASE_URL, auction_id)),
        1,
    )
    .send()
    .await
    .unwrap();
    let retried: Value = response.json().await.unwrap();
    assert_eq!(retried["id"], payment["id"]);

    // B의 리뷰 시도 -> NOT_WINNER
    let response = with_user(
        client.post(format!("{}/auctions/{}/reviews", BASE_URL, auction_id)),
        2,
    )
    .json(&json!({ "rating": 5, "comment": "좋은 거래였습니다." }))
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A의 첫 리뷰 -> 성공
    let response = with_user(
        client.post(format!("{}/auctions/{}/reviews", BASE_URL, auction_id)),
        1,
    )
    .json(&json!({ "rating": 5, "comment": "좋은 거래였습니다." }))
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // A의 두 번째 리뷰 -> ALREADY_REVIEWED
    let response = with_user(
        client.post(format!("{}/auctions/{}/reviews", BASE_URL, auction_id)),
        1,
    )
    .json(&json!({ "rating": 4, "comment": "두 번째 리뷰" }))
    .send()
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "ALREADY_REVIEWED");
}

/// 동시 입찰 테스트: 같은 금액의 동시 입찰은 하나만 수락되어야 한다
#[tokio::test]
#[ignore = "로컬 서비스, PostgreSQL, Kafka 필요"]
async fn test_concurrent_same_amount_bids() {
    let client = Client::new();
    let auction = create_test_auction(&client, 100, 3600).await;
    let auction_id = auction["id"].as_i64().unwrap();

    // 서로 다른 사용자 20명이 같은 금액으로 동시 입찰
    let mut handles = vec![];
    for bidder_id in 1..=20 {
        let handle = tokio::spawn(async move {
            let client = Client::new();
            place_bid(&client, auction_id, bidder_id, 150).await
        });
        handles.push(handle);
    }

    let mut accepted = 0;
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        if status == StatusCode::CREATED {
            accepted += 1;
        }
    }

    // 조건부 갱신이 직렬화하므로 정확히 한 건만 수락
    assert_eq!(accepted, 1);

    let bids: Value = client
        .get(format!("{}/auctions/{}/bids", BASE_URL, auction_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bids.as_array().map(|b| b.len()), Some(1));
}

/// 라이브 스냅샷이 입찰을 미러링하는지 확인
#[tokio::test]
#[ignore = "로컬 서비스, PostgreSQL, Kafka 필요"]
async fn test_live_feed_mirrors_bids() {
    let client = Client::new();
    let auction = create_test_auction(&client, 100, 3600).await;
    let auction_id = auction["id"].as_i64().unwrap();

    let (status, _) = place_bid(&client, auction_id, 3, 200).await;
    assert_eq!(status, StatusCode::CREATED);

    // 변경 알림 전파 대기
    tokio::time::sleep(tokio::time::Duration::from_millis(1500)).await;

    let live: Value = client
        .get(format!("{}/auctions/{}/live", BASE_URL, auction_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(live["last_bidder_id"].as_i64(), Some(3));
    assert_eq!(live["bid_count"].as_u64(), Some(1));
}
