use crate::domain::entities::{UserProfile, UserRole};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::Database;
use crate::shared::utils::timestamp::{format_timestamp, parse_timestamp};
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl UserRepository for Database {
    async fn upsert_user_profile(&self, profile: &UserProfile) -> ApiResult<()> {
        // Re-registration keeps the original created_at
        sqlx::query(
            "INSERT INTO users (uid, name, email, role, created_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(uid) DO UPDATE SET
                 name = excluded.name,
                 email = excluded.email,
                 role = excluded.role",
        )
        .bind(&profile.uid)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(profile.role.as_str())
        .bind(format_timestamp(&profile.created_at))
        .execute(&self.pool)
        .await?;

        tracing::info!(uid = %profile.uid, role = %profile.role, "User profile saved");

        Ok(())
    }

    async fn get_user_profile(&self, uid: &str) -> ApiResult<Option<UserProfile>> {
        let row = sqlx::query(
            "SELECT uid, name, email, role, created_at
             FROM users
             WHERE uid = ?",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            let role: String = row.try_get("role")?;
            let created_at: String = row.try_get("created_at")?;

            Ok(Some(UserProfile {
                uid: row.try_get("uid")?,
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                role: role.parse::<UserRole>().map_err(ApiError::Internal)?,
                created_at: parse_timestamp(&created_at)
                    .map_err(|e| ApiError::Internal(format!("Invalid stored timestamp: {}", e)))?,
            }))
        } else {
            Ok(None)
        }
    }
}
