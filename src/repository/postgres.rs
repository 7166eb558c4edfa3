use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::ResetResult;
use crate::models::{NewResetRequest, ResetRequest};
use crate::repository::ResetRequestRepository;

#[derive(Debug, Clone)]
pub struct PgResetRequestRepository {
    pool: PgPool,
}

impl PgResetRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetRequestRepository for PgResetRequestRepository {
    async fn save(&self, request: NewResetRequest) -> ResetResult<Option<ResetRequest>> {
        match db::reset_requests::create(&self.pool, &request).await {
            Ok(saved) => Ok(Some(saved)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::debug!("Selector collision on insert");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_selector(&self, selector: &str) -> ResetResult<Option<ResetRequest>> {
        Ok(db::reset_requests::find_by_selector(&self.pool, selector).await?)
    }

    async fn delete(&self, id: Uuid) -> ResetResult<bool> {
        Ok(db::reset_requests::delete(&self.pool, id).await?)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> ResetResult<u64> {
        Ok(db::reset_requests::delete_expired(&self.pool, now).await?)
    }

    async fn most_recent_non_expired(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResetResult<Option<DateTime<Utc>>> {
        Ok(db::reset_requests::most_recent_non_expired(&self.pool, user_id, now).await?)
    }

    async fn count_non_expired(&self, user_id: Uuid, now: DateTime<Utc>) -> ResetResult<u64> {
        let count = db::reset_requests::count_non_expired(&self.pool, user_id, now).await?;
        Ok(count.max(0) as u64)
    }

    async fn find_all(&self) -> ResetResult<Vec<ResetRequest>> {
        Ok(db::reset_requests::find_all(&self.pool).await?)
    }
}
