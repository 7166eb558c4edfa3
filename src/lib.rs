pub mod config;
pub mod error;
pub mod clock;
pub mod token;
pub mod models;
pub mod db;
pub mod repository;
pub mod store;
pub mod cleanup;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::repository::PgResetRequestRepository;
use crate::store::ResetRequestStore;
use crate::token::TokenHasher;

pub use crate::error::{ResetError, ResetResult};
pub use crate::models::ResetRequest;
pub use crate::token::ResetToken;

/// Wire a Postgres-backed store from loaded configuration.
pub fn build_store(pool: PgPool, config: &Config) -> Result<ResetRequestStore, String> {
    let repo = Arc::new(PgResetRequestRepository::new(pool));
    let hasher = TokenHasher::new(&config.signing_key);
    ResetRequestStore::new(repo, hasher, config.reset.clone())
}
