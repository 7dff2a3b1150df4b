use crate::{DbError, DbPool};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub publish_start_at: Option<String>,
    pub publish_end_at: Option<String>,
    pub is_weekly: bool,
    pub is_live: bool,
    pub day_of_week: Option<i64>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values written on insert and on full-row update.
#[derive(Debug, Clone, Default)]
pub struct EventFields<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub publish_start_at: Option<&'a str>,
    pub publish_end_at: Option<&'a str>,
    pub is_weekly: bool,
    pub is_live: bool,
    pub day_of_week: Option<i64>,
    pub starts_at: Option<&'a str>,
    pub ends_at: Option<&'a str>,
}

const EVENT_COLUMNS: &str = "id, tenant_id, name, description, status, publish_start_at, \
     publish_end_at, is_weekly, is_live, day_of_week, starts_at, ends_at, created_at, updated_at";

pub async fn create_event(
    pool: &DbPool,
    tenant_id: i64,
    fields: &EventFields<'_>,
) -> Result<EventRow, DbError> {
    let sql = format!(
        "INSERT INTO events (tenant_id, name, description, status, publish_start_at,
             publish_end_at, is_weekly, is_live, day_of_week, starts_at, ends_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         RETURNING {EVENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, EventRow>(&sql)
        .bind(tenant_id)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.status)
        .bind(fields.publish_start_at)
        .bind(fields.publish_end_at)
        .bind(fields.is_weekly)
        .bind(fields.is_live)
        .bind(fields.day_of_week)
        .bind(fields.starts_at)
        .bind(fields.ends_at)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

pub async fn get_event(pool: &DbPool, id: i64) -> Result<Option<EventRow>, DbError> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");
    let row = sqlx::query_as::<_, EventRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn get_tenant_events(pool: &DbPool, tenant_id: i64) -> Result<Vec<EventRow>, DbError> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events
         WHERE tenant_id = ?1
         ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, EventRow>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Result of a full-row update.
#[derive(Debug, Clone)]
pub struct EventUpdate {
    pub row: EventRow,
    /// Instances removed because they no longer fall on the event's weekday.
    pub pruned_instances: u64,
}

/// Overwrite every editable column. Callers merge partial edits first.
///
/// Instances that stop matching the event are deleted in the same
/// transaction: all of them once the event is no longer weekly, otherwise
/// those whose date is not on `day_of_week` (0 = Sunday, as `strftime('%w')`).
pub async fn update_event(
    pool: &DbPool,
    id: i64,
    fields: &EventFields<'_>,
) -> Result<EventUpdate, DbError> {
    let mut tx = pool.begin().await?;
    let sql = format!(
        "UPDATE events SET
             name = ?2, description = ?3, status = ?4, publish_start_at = ?5,
             publish_end_at = ?6, is_weekly = ?7, is_live = ?8, day_of_week = ?9,
             starts_at = ?10, ends_at = ?11, updated_at = datetime('now')
         WHERE id = ?1
         RETURNING {EVENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, EventRow>(&sql)
        .bind(id)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.status)
        .bind(fields.publish_start_at)
        .bind(fields.publish_end_at)
        .bind(fields.is_weekly)
        .bind(fields.is_live)
        .bind(fields.day_of_week)
        .bind(fields.starts_at)
        .bind(fields.ends_at)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

    let pruned = sqlx::query(
        "DELETE FROM event_instances
         WHERE event_id = ?1
           AND (?2 = 0
                OR ?3 IS NULL
                OR CAST(strftime('%w', instance_date) AS INTEGER) != ?3)",
    )
    .bind(id)
    .bind(row.is_weekly)
    .bind(row.day_of_week)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(EventUpdate {
        row,
        pruned_instances: pruned.rows_affected(),
    })
}

pub async fn delete_event(pool: &DbPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
