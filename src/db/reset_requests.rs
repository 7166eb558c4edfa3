use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewResetRequest, ResetRequest};

pub async fn create(
    pool: &PgPool,
    request: &NewResetRequest,
) -> Result<ResetRequest, sqlx::Error> {
    sqlx::query_as::<_, ResetRequest>(
        "INSERT INTO reset_requests (user_id, selector, hashed_verifier, requested_at, expires_at)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(request.user_id)
    .bind(&request.selector)
    .bind(&request.hashed_verifier)
    .bind(request.requested_at)
    .bind(request.expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_selector(
    pool: &PgPool,
    selector: &str,
) -> Result<Option<ResetRequest>, sqlx::Error> {
    sqlx::query_as::<_, ResetRequest>("SELECT * FROM reset_requests WHERE selector = $1")
        .bind(selector)
        .fetch_optional(pool)
        .await
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<ResetRequest>, sqlx::Error> {
    sqlx::query_as::<_, ResetRequest>(
        "SELECT * FROM reset_requests ORDER BY requested_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await
}

/// Delete by id. Returns true only for the call that actually removed the row.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reset_requests WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reset_requests WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn most_recent_non_expired(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT requested_at FROM reset_requests
         WHERE user_id = $1 AND expires_at > $2
         ORDER BY requested_at DESC, id DESC
         LIMIT 1",
    )
    .bind(user_id)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn count_non_expired(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM reset_requests WHERE user_id = $1 AND expires_at > $2",
    )
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await
}
