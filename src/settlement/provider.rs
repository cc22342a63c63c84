/// 결제 제공자 인터페이스
/// 게이트 로직은 제공자 구현을 모른다. 스텁은 고정 지연 후 무조건
/// 성공하는 구현이고, 실제 게이트웨이는 같은 트레이트로 교체한다.
// region:    --- Imports
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::time::{sleep, Duration};
use tracing::info;
// endregion: --- Imports

// region:    --- Payment Provider
/// 생성된 결제 의도
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub token: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// 결제 의도 생성
    async fn create_intent(
        &self,
        product_id: i64,
        payer_id: i64,
        amount: Decimal,
    ) -> Result<PaymentIntent, AppError>;

    /// 결제 확정
    async fn confirm(&self, intent: &PaymentIntent) -> Result<(), AppError>;
}
// endregion: --- Payment Provider

// region:    --- Stub Provider
/// 항상 성공하는 스텁 제공자
pub struct StubPaymentProvider {
    delay: Duration,
}

impl StubPaymentProvider {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_secs(2),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for StubPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for StubPaymentProvider {
    async fn create_intent(
        &self,
        product_id: i64,
        payer_id: i64,
        amount: Decimal,
    ) -> Result<PaymentIntent, AppError> {
        let token = format!(
            "stub-{}-{}-{}",
            product_id,
            payer_id,
            Utc::now().timestamp_millis()
        );
        info!(
            "{:<12} --> 결제 의도 생성: token={}, amount={}",
            "StubPayment", token, amount
        );
        Ok(PaymentIntent { token })
    }

    async fn confirm(&self, intent: &PaymentIntent) -> Result<(), AppError> {
        // 실제 게이트웨이 왕복을 흉내 낸 고정 지연
        sleep(self.delay).await;
        info!("{:<12} --> 결제 확정: token={}", "StubPayment", intent.token);
        Ok(())
    }
}
// endregion: --- Stub Provider

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_provider_always_confirms() {
        let provider = StubPaymentProvider::with_delay(Duration::ZERO);
        let intent = provider
            .create_intent(1, 2, Decimal::new(12000, 2))
            .await
            .unwrap();
        assert!(intent.token.starts_with("stub-1-2-"));
        assert!(provider.confirm(&intent).await.is_ok());
    }
}
// endregion: --- Tests
