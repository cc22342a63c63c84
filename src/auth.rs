/// 요청 단위 사용자 신원
/// 세션 관리는 외부 인증 게이트웨이 몫이고, 여기서는 게이트웨이가
/// 붙여 주는 헤더를 읽어 명시적인 값으로 각 커맨드에 넘기기만 한다.
// region:    --- Imports
use crate::error::AppError;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
// endregion: --- Imports

// region:    --- Auth User
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or(AppError::Unauthorized)?;

        let email = parts
            .headers
            .get("x-user-email")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(AuthUser { user_id, email })
    }
}
// endregion: --- Auth User

// endregion: --- Tests
