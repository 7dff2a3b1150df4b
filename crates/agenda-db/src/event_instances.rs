use crate::{DbError, DbPool};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventInstanceRow {
    pub id: i64,
    pub event_id: i64,
    pub instance_date: String,
    pub status: String,
    pub custom_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dates already materialized for an event, ascending.
pub async fn get_instance_dates(pool: &DbPool, event_id: i64) -> Result<Vec<String>, DbError> {
    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT instance_date FROM event_instances
         WHERE event_id = ?1
         ORDER BY instance_date ASC",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert one row per date inside a single transaction. Dates that already
/// exist for the event are skipped by the unique index, so concurrent
/// generators never duplicate a date. Returns the number of rows written.
pub async fn insert_instances(
    pool: &DbPool,
    event_id: i64,
    dates: &[String],
    status: &str,
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;
    for date in dates {
        let result = sqlx::query(
            "INSERT INTO event_instances (event_id, instance_date, status)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (event_id, instance_date) DO NOTHING",
        )
        .bind(event_id)
        .bind(date)
        .bind(status)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }
    tx.commit().await?;
    Ok(inserted)
}

pub async fn get_event_instances(
    pool: &DbPool,
    event_id: i64,
) -> Result<Vec<EventInstanceRow>, DbError> {
    let rows = sqlx::query_as::<_, EventInstanceRow>(
        "SELECT id, event_id, instance_date, status, custom_description, created_at
         FROM event_instances
         WHERE event_id = ?1
         ORDER BY instance_date ASC",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_instance(pool: &DbPool, id: i64) -> Result<Option<EventInstanceRow>, DbError> {
    let row = sqlx::query_as::<_, EventInstanceRow>(
        "SELECT id, event_id, instance_date, status, custom_description, created_at
         FROM event_instances WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Set the stored status. `custom_description` is left untouched when `None`.
pub async fn update_instance(
    pool: &DbPool,
    id: i64,
    status: &str,
    custom_description: Option<&str>,
) -> Result<EventInstanceRow, DbError> {
    let row = sqlx::query_as::<_, EventInstanceRow>(
        "UPDATE event_instances
         SET status = ?2, custom_description = COALESCE(?3, custom_description)
         WHERE id = ?1
         RETURNING id, event_id, instance_date, status, custom_description, created_at",
    )
    .bind(id)
    .bind(status)
    .bind(custom_description)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;
    Ok(row)
}

pub async fn delete_instance(pool: &DbPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM event_instances WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
