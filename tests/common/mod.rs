#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use reset_requests::clock::ManualClock;
use reset_requests::config::ResetSettings;
use reset_requests::repository::{MemoryResetRequestRepository, PgResetRequestRepository};
use reset_requests::store::ResetRequestStore;
use reset_requests::token::TokenHasher;

pub const SIGNING_KEY: &str = "test-signing-key-that-is-long-enough";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// A store over the in-memory repository with a hand-driven clock.
pub struct MemoryHarness {
    pub store: Arc<ResetRequestStore>,
    pub repo: Arc<MemoryResetRequestRepository>,
    pub clock: Arc<ManualClock>,
}

pub fn memory_store(settings: ResetSettings) -> MemoryHarness {
    let repo = Arc::new(MemoryResetRequestRepository::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let store = ResetRequestStore::with_clock(
        repo.clone(),
        TokenHasher::new(SIGNING_KEY),
        settings,
        clock.clone(),
    )
    .expect("valid settings");

    MemoryHarness {
        store: Arc::new(store),
        repo,
        clock,
    }
}

/// A store over a throwaway Postgres database.
pub struct PgHarness {
    pub store: Arc<ResetRequestStore>,
    pub repo: Arc<PgResetRequestRepository>,
    pub clock: Arc<ManualClock>,
    pub pool: PgPool,
    pub db_name: String,
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Create a fresh database and migrate it. Returns `None` when
/// `DATABASE_URL` is not set so the Postgres suite can be skipped locally.
pub async fn pg_store(settings: ResetSettings) -> Option<PgHarness> {
    let _ = dotenvy::dotenv();

    let Ok(base_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let db_name = format!("reset_requests_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let repo = Arc::new(PgResetRequestRepository::new(pool.clone()));
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = ResetRequestStore::with_clock(
        repo.clone(),
        TokenHasher::new(SIGNING_KEY),
        settings,
        clock.clone(),
    )
    .expect("valid settings");

    Some(PgHarness {
        store: Arc::new(store),
        repo,
        clock,
        pool,
        db_name,
    })
}

/// Drop the test database.
pub async fn cleanup(harness: PgHarness) {
    let db_name = harness.db_name.clone();
    harness.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
