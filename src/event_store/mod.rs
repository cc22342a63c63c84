// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::error::AppError;
use crate::message_broker::{KafkaProducer, AUCTION_EVENTS_TOPIC};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::debug;

// endregion: --- Imports

// region:    --- Event Model
/// 이벤트 로그 행. 변경 알림 채널로도 같은 모양이 발행된다.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: i64,
    pub aggregate_id: i64,
    pub event_type: String,
    pub data: serde_json::Value,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event {
    /// 로그 행의 data 컬럼을 도메인 이벤트로 복원
    pub fn to_auction_event(&self) -> Result<AuctionEvent, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}
// endregion: --- Event Model

// region:    --- Event Store
/// 이벤트 로그 + 변경 알림 발행
/// 쓰기 정합성은 커맨드 쪽 트랜잭션이 책임지므로 여기는 커밋된 사실을
/// 기록하고 알리는 역할만 한다.
#[async_trait]
pub trait EventStore {
    async fn append_and_publish(&self, event: AuctionEvent) -> Result<(), AppError>;
}

pub struct PostgresEventStore {
    pool: Arc<PgPool>,
    kafka_producer: Arc<KafkaProducer>,
}

impl PostgresEventStore {
    pub fn new(pool: Arc<PgPool>, kafka_producer: Arc<KafkaProducer>) -> Self {
        Self {
            pool,
            kafka_producer,
        }
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn append_and_publish(&self, event: AuctionEvent) -> Result<(), AppError> {
        let timestamp = chrono::Utc::now();
        let data = serde_json::to_value(&event)
            .map_err(|e| AppError::Broker(format!("이벤트 직렬화 실패: {}", e)))?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (aggregate_id, event_type, data, timestamp)
            VALUES ($1, $2, $3, $4)
            RETURNING id",
        )
        .bind(event.product_id())
        .bind(event.kind())
        .bind(&data)
        .bind(timestamp)
        .fetch_one(&*self.pool)
        .await?;

        let stored = Event {
            id,
            aggregate_id: event.product_id(),
            event_type: event.kind().to_string(),
            data,
            timestamp,
        };

        // 커밋된 이벤트를 변경 알림 토픽에 발행
        self.kafka_producer
            .send_message(
                AUCTION_EVENTS_TOPIC,
                &id.to_string(),
                &serde_json::to_string(&stored)
                    .map_err(|e| AppError::Broker(format!("이벤트 직렬화 실패: {}", e)))?,
            )
            .await
            .map_err(AppError::Broker)?;

        debug!(
            "{:<12} --> 이벤트 기록 및 발행: {} (id={})",
            "EventStore",
            event.kind(),
            id
        );
        Ok(())
    }
}
// endregion: --- Event Store
