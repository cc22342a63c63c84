/// 경매 상태 수렴 스케줄러
/// 마감/시작 판정의 기준은 auction::state의 시간 기반 판정이고,
/// 이 태스크는 저장된 status 컬럼을 그 판정에 맞게 뒤따라 갱신한다.
/// 목록 조회가 올바른 상태를 읽게 하고, 마감 이벤트를 발행하는 역할.
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::event_store::{EventStore, PostgresEventStore};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error};

// endregion: --- Imports

// region:    --- Auction Scheduler
pub struct AuctionScheduler {
    pool: Arc<PgPool>,
    event_store: Arc<PostgresEventStore>,
}

impl AuctionScheduler {
    pub fn new(pool: Arc<PgPool>, event_store: Arc<PostgresEventStore>) -> Self {
        Self { pool, event_store }
    }

    /// 스케줄러 시작
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        let event_store = Arc::clone(&self.event_store);
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                if let Err(e) = Self::sweep_statuses(&pool, event_store.as_ref()).await {
                    error!(
                        "{:<12} --> 경매 상태 갱신 중 오류 발생: {:?}",
                        "Scheduler", e
                    );
                }
            }
        });
    }

    /// 저장 상태를 시간 기준 판정에 맞게 갱신
    async fn sweep_statuses(
        pool: &PgPool,
        event_store: &PostgresEventStore,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now();

        // pending -> active
        sqlx::query(
            "UPDATE products SET status = 'active'
             WHERE status = 'pending' AND start_time <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;

        // active -> completed, 마감된 상품 id 수집
        let completed: Vec<(i64,)> = sqlx::query_as(
            "UPDATE products SET status = 'completed'
             WHERE status = 'active' AND end_time <= $1
             RETURNING id",
        )
        .bind(now)
        .fetch_all(pool)
        .await?;

        for (product_id,) in completed {
            debug!("{:<12} --> 경매 마감 처리: id={}", "Scheduler", product_id);
            if let Err(e) = event_store
                .append_and_publish(AuctionEvent::AuctionCompleted {
                    product_id,
                    timestamp: now,
                })
                .await
            {
                error!(
                    "{:<12} --> 마감 이벤트 발행 실패: id={}, {:?}",
                    "Scheduler", product_id, e
                );
            }
        }

        Ok(())
    }
}
// endregion: --- Auction Scheduler
