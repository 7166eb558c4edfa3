use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::ResetSettings;
use crate::error::{ResetError, ResetResult};
use crate::models::{NewResetRequest, ResetRequest};
use crate::repository::ResetRequestRepository;
use crate::token::{self, ResetToken, TokenHasher};

const SELECTOR_ATTEMPTS: usize = 3;

fn shift(at: DateTime<Utc>, by: Duration) -> ResetResult<DateTime<Utc>> {
    at.checked_add_signed(by)
        .ok_or_else(|| ResetError::Storage(format!("Timestamp {at} + {by} is out of range")))
}

/// Issues, looks up and retires password reset requests.
pub struct ResetRequestStore {
    repo: Arc<dyn ResetRequestRepository>,
    clock: Arc<dyn Clock>,
    hasher: TokenHasher,
    settings: ResetSettings,
}

impl ResetRequestStore {
    pub fn new(
        repo: Arc<dyn ResetRequestRepository>,
        hasher: TokenHasher,
        settings: ResetSettings,
    ) -> Result<Self, String> {
        Self::with_clock(repo, hasher, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repo: Arc<dyn ResetRequestRepository>,
        hasher: TokenHasher,
        settings: ResetSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, String> {
        settings.validate()?;
        Ok(Self {
            repo,
            clock,
            hasher,
            settings,
        })
    }

    /// Issue a new reset request for `user_id` and return its one-time token.
    pub async fn create(&self, user_id: Uuid) -> ResetResult<ResetToken> {
        if self.settings.garbage_collect {
            self.remove_expired().await?;
        }

        // Postgres keeps microseconds; match it so stored and returned times agree.
        let now = self.clock.now().trunc_subsecs(6);

        if let Some(throttle) = self.settings.request_throttle {
            if let Some(last) = self.repo.most_recent_non_expired(user_id, now).await? {
                let available_at = shift(last, throttle)?;
                if available_at > now {
                    tracing::debug!("Reset request for user {user_id} throttled until {available_at}");
                    return Err(ResetError::TooManyRequests { available_at });
                }
            }
        }

        let expires_at = shift(now, self.settings.token_lifetime)?;

        for _ in 0..SELECTOR_ATTEMPTS {
            let selector = token::random_string(self.settings.selector_length);
            let verifier = token::random_string(self.settings.verifier_length);
            let hashed_verifier = self.hasher.hash(&verifier, user_id, expires_at);

            let saved = self
                .repo
                .save(NewResetRequest {
                    user_id,
                    selector,
                    hashed_verifier,
                    requested_at: now,
                    expires_at,
                })
                .await?;

            if let Some(saved) = saved {
                tracing::info!("Reset request {} created for user {user_id}", saved.id);
                return Ok(ResetToken::new(
                    saved.selector,
                    verifier,
                    saved.expires_at,
                    saved.requested_at,
                ));
            }
        }

        Err(ResetError::Storage(format!(
            "Could not allocate a unique selector after {SELECTOR_ATTEMPTS} attempts"
        )))
    }

    pub async fn find(&self, selector: &str) -> ResetResult<ResetRequest> {
        self.repo
            .find_by_selector(selector)
            .await?
            .ok_or(ResetError::NotFound)
    }

    /// Validate a selector/verifier pair and retire the request on success.
    ///
    /// Expired and mismatched requests are left in place for cleanup.
    pub async fn consume(&self, selector: &str, verifier: &str) -> ResetResult<Uuid> {
        let request = self.find(selector).await?;

        if request.is_expired(self.clock.now()) {
            return Err(ResetError::Expired);
        }

        if !self.hasher.verify(
            verifier,
            request.user_id,
            request.expires_at,
            &request.hashed_verifier,
        ) {
            tracing::warn!("Reset request {} presented with a bad verifier", request.id);
            return Err(ResetError::InvalidToken);
        }

        // Lost the race to a concurrent consume or remove.
        if !self.repo.delete(request.id).await? {
            return Err(ResetError::NotFound);
        }

        tracing::info!("Reset request {} consumed", request.id);
        Ok(request.user_id)
    }

    /// Like [`consume`](Self::consume), taking the combined public token.
    pub async fn consume_token(&self, token: &str) -> ResetResult<Uuid> {
        let (selector, verifier) = token::split_token(token, self.settings.selector_length)
            .ok_or(ResetError::InvalidToken)?;
        self.consume(selector, verifier).await
    }

    pub async fn most_recent_non_expired_for(
        &self,
        user_id: Uuid,
    ) -> ResetResult<Option<DateTime<Utc>>> {
        self.repo
            .most_recent_non_expired(user_id, self.clock.now())
            .await
    }

    pub async fn count_non_expired_for(&self, user_id: Uuid) -> ResetResult<u64> {
        self.repo.count_non_expired(user_id, self.clock.now()).await
    }

    /// Delete a request. Removing one that is already gone is not an error.
    pub async fn remove(&self, request: &ResetRequest) -> ResetResult<()> {
        if self.repo.delete(request.id).await? {
            tracing::info!("Reset request {} removed", request.id);
        }
        Ok(())
    }

    pub async fn remove_expired(&self) -> ResetResult<u64> {
        let removed = self.repo.delete_expired(self.clock.now()).await?;
        if removed > 0 {
            tracing::debug!("Removed {removed} expired reset requests");
        }
        Ok(removed)
    }

    /// A token indistinguishable in shape from a real one, backed by nothing.
    pub fn fake_token(&self) -> ResetResult<ResetToken> {
        let now = self.clock.now().trunc_subsecs(6);
        Ok(ResetToken::new(
            token::random_string(self.settings.selector_length),
            token::random_string(self.settings.verifier_length),
            shift(now, self.settings.token_lifetime)?,
            now,
        ))
    }
}
