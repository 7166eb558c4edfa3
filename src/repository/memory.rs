use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use crate::error::ResetResult;
use crate::models::{NewResetRequest, ResetRequest};
use crate::repository::ResetRequestRepository;

/// In-process repository keyed by selector.
#[derive(Debug, Default)]
pub struct MemoryResetRequestRepository {
    /// selector -> request
    entries: DashMap<String, ResetRequest>,
}

impl MemoryResetRequestRepository {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResetRequestRepository for MemoryResetRequestRepository {
    async fn save(&self, request: NewResetRequest) -> ResetResult<Option<ResetRequest>> {
        match self.entries.entry(request.selector.clone()) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                let saved = ResetRequest {
                    id: Uuid::now_v7(),
                    user_id: request.user_id,
                    selector: request.selector,
                    hashed_verifier: request.hashed_verifier,
                    requested_at: request.requested_at,
                    expires_at: request.expires_at,
                };
                slot.insert(saved.clone());
                Ok(Some(saved))
            }
        }
    }

    async fn find_by_selector(&self, selector: &str) -> ResetResult<Option<ResetRequest>> {
        Ok(self.entries.get(selector).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: Uuid) -> ResetResult<bool> {
        let selector = self
            .entries
            .iter()
            .find(|entry| entry.value().id == id)
            .map(|entry| entry.key().clone());

        let Some(selector) = selector else {
            return Ok(false);
        };

        Ok(self
            .entries
            .remove_if(&selector, |_, request| request.id == id)
            .is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> ResetResult<u64> {
        let mut removed = 0u64;
        self.entries.retain(|_, request| {
            let keep = !request.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn most_recent_non_expired(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResetResult<Option<DateTime<Utc>>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.user_id == user_id && !entry.is_expired(now))
            .max_by_key(|entry| (entry.requested_at, entry.id))
            .map(|entry| entry.requested_at))
    }

    async fn count_non_expired(&self, user_id: Uuid, now: DateTime<Utc>) -> ResetResult<u64> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.user_id == user_id && !entry.is_expired(now))
            .count() as u64)
    }

    async fn find_all(&self) -> ResetResult<Vec<ResetRequest>> {
        let mut all: Vec<ResetRequest> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|request| (request.requested_at, request.id));
        Ok(all)
    }
}
