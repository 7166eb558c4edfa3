pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ResetResult;
use crate::models::{NewResetRequest, ResetRequest};

pub use memory::MemoryResetRequestRepository;
pub use postgres::PgResetRequestRepository;

/// Durable storage for reset requests.
#[async_trait]
pub trait ResetRequestRepository: Send + Sync {
    /// Persist a new request. `None` means the selector is already taken.
    async fn save(&self, request: NewResetRequest) -> ResetResult<Option<ResetRequest>>;

    async fn find_by_selector(&self, selector: &str) -> ResetResult<Option<ResetRequest>>;

    /// Remove by id. Of any number of concurrent calls for the same id, at
    /// most one returns true.
    async fn delete(&self, id: Uuid) -> ResetResult<bool>;

    /// Remove every request with `expires_at <= now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> ResetResult<u64>;

    async fn most_recent_non_expired(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResetResult<Option<DateTime<Utc>>>;

    async fn count_non_expired(&self, user_id: Uuid, now: DateTime<Utc>) -> ResetResult<u64>;

    /// All stored requests, oldest first.
    async fn find_all(&self) -> ResetResult<Vec<ResetRequest>>;
}
