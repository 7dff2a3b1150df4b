use agenda_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("end date precedes start date")]
    InvalidRange,
    #[error("day of week must be between 0 and 6, got {0}")]
    InvalidDayOfWeek(i64),
    #[error("invalid date or time: {0}")]
    InvalidDate(String),
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database error: {0}")]
    Database(DbError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for CoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => CoreError::NotFound,
            other => CoreError::Database(other),
        }
    }
}
