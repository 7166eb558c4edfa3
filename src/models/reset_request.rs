use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct ResetRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub selector: String,
    #[serde(skip_serializing)]
    pub hashed_verifier: String,
    pub requested_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ResetRequest {
    /// Expired once `now` reaches `expires_at`: the expiry instant itself is
    /// already expired. `consume`, `delete_expired` and the non-expired
    /// lookups all use this same rule, so no request is ever both
    /// consumable and purgeable.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A request ready to be persisted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewResetRequest {
    pub user_id: Uuid,
    pub selector: String,
    pub hashed_verifier: String,
    pub requested_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
