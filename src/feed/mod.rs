/// 실시간 입찰 피드
/// 변경 알림 토픽을 구독해 경매별 라이브 스냅샷을 로컬에 미러링한다.
/// 동기화 로직은 따로 없고, 발행 순서대로 덮어쓴다(last write wins).
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::message_broker::{KafkaConsumer, AUCTION_EVENTS_TOPIC};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Live State
/// 채널이 끊겼을 때 재구독까지 기다리는 시간 (고정 지연, 백오프 없음)
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// 경매 하나의 미러링된 라이브 상태
#[derive(Debug, Clone, Serialize)]
pub struct LiveAuction {
    pub product_id: i64,
    pub current_price: Option<Decimal>,
    pub last_bidder_id: Option<i64>,
    pub bid_count: u64,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl LiveAuction {
    fn new(product_id: i64, at: DateTime<Utc>) -> Self {
        LiveAuction {
            product_id,
            current_price: None,
            last_bidder_id: None,
            bid_count: 0,
            completed: false,
            updated_at: at,
        }
    }
}
// endregion: --- Live State

// region:    --- Bid Feed
pub struct BidFeed {
    state: RwLock<HashMap<i64, LiveAuction>>,
    tx: broadcast::Sender<AuctionEvent>,
}

impl BidFeed {
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(256);
        Arc::new(BidFeed {
            state: RwLock::new(HashMap::new()),
            tx,
        })
    }

    /// 프로세스 내 구독자용 이벤트 스트림
    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.tx.subscribe()
    }

    /// 경매 라이브 스냅샷 조회
    pub fn snapshot(&self, product_id: i64) -> Option<LiveAuction> {
        self.state
            .read()
            .ok()
            .and_then(|map| map.get(&product_id).cloned())
    }

    /// 이벤트를 로컬 상태에 반영하고 구독자에게 중계
    pub fn apply(&self, event: &AuctionEvent) {
        if let Ok(mut map) = self.state.write() {
            match event {
                AuctionEvent::BidPlaced {
                    product_id,
                    bidder_id,
                    current_price,
                    timestamp,
                    ..
                } => {
                    let live = map
                        .entry(*product_id)
                        .or_insert_with(|| LiveAuction::new(*product_id, *timestamp));
                    live.current_price = Some(*current_price);
                    live.last_bidder_id = Some(*bidder_id);
                    live.bid_count += 1;
                    live.updated_at = *timestamp;
                }
                AuctionEvent::AuctionCompleted {
                    product_id,
                    timestamp,
                } => {
                    let live = map
                        .entry(*product_id)
                        .or_insert_with(|| LiveAuction::new(*product_id, *timestamp));
                    live.completed = true;
                    live.updated_at = *timestamp;
                }
                // 결제/리뷰 이벤트는 스냅샷을 바꾸지 않고 중계만 한다
                AuctionEvent::PaymentCompleted { .. } | AuctionEvent::ReviewSubmitted { .. } => {}
            }
        }
        // 구독자가 없으면 무시
        let _ = self.tx.send(event.clone());
    }

    /// 구독 태스크 시작. 채널이 끊기면 고정 지연 후 재구독한다.
    pub fn start(self: &Arc<Self>, consumer: Arc<KafkaConsumer>) {
        let feed = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let feed_inner = Arc::clone(&feed);
                let result = consumer
                    .consume_events(AUCTION_EVENTS_TOPIC, move |event| {
                        let feed = Arc::clone(&feed_inner);
                        Box::pin(async move {
                            match event.to_auction_event() {
                                Ok(auction_event) => feed.apply(&auction_event),
                                Err(e) => {
                                    error!("{:<12} --> 이벤트 복원 오류: {:?}", "Feed", e)
                                }
                            }
                            Ok(())
                        })
                    })
                    .await;

                if let Err(e) = result {
                    error!("{:<12} --> 피드 채널 끊김: {:?}", "Feed", e);
                }
                info!(
                    "{:<12} --> {}초 후 재구독",
                    "Feed",
                    RECONNECT_DELAY.as_secs()
                );
                sleep(RECONNECT_DELAY).await;
            }
        });
    }
}
// endregion: --- Bid Feed

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value * 100, 2)
    }

    #[test]
    fn bid_events_update_snapshot() {
        let feed = BidFeed::new();
        let now = Utc::now();

        feed.apply(&AuctionEvent::BidPlaced {
            product_id: 1,
            bidder_id: 10,
            amount: dec(120),
            current_price: dec(120),
            timestamp: now,
        });
        feed.apply(&AuctionEvent::BidPlaced {
            product_id: 1,
            bidder_id: 11,
            amount: dec(130),
            current_price: dec(130),
            timestamp: now,
        });

        let live = feed.snapshot(1).unwrap();
        assert_eq!(live.current_price, Some(dec(130)));
        assert_eq!(live.last_bidder_id, Some(11));
        assert_eq!(live.bid_count, 2);
        assert!(!live.completed);
    }

    #[test]
    fn completion_event_marks_snapshot_completed() {
        let feed = BidFeed::new();
        let now = Utc::now();

        feed.apply(&AuctionEvent::AuctionCompleted {
            product_id: 3,
            timestamp: now,
        });

        let live = feed.snapshot(3).unwrap();
        assert!(live.completed);
        assert_eq!(live.bid_count, 0);
    }

    #[tokio::test]
    async fn subscribers_receive_relayed_events() {
        let feed = BidFeed::new();
        let mut rx = feed.subscribe();
        let now = Utc::now();

        feed.apply(&AuctionEvent::BidPlaced {
            product_id: 5,
            bidder_id: 1,
            amount: dec(110),
            current_price: dec(110),
            timestamp: now,
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, AuctionEvent::BidPlaced { product_id: 5, .. }));
    }
}
// endregion: --- Tests
