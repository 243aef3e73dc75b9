use crate::domain::entities::UserProfile;
use crate::infrastructure::http::middleware::error::ApiResult;

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or overwrite the profile stored under `profile.uid`.
    async fn upsert_user_profile(&self, profile: &UserProfile) -> ApiResult<()>;

    async fn get_user_profile(&self, uid: &str) -> ApiResult<Option<UserProfile>>;
}
