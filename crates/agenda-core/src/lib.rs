pub mod error;
pub mod events;
pub mod instances;
pub mod observability;
pub mod recurrence;
pub mod rows;
pub mod status;
pub mod time;

use agenda_db::DbPool;

/// Default cap on the number of days a single generate request may span.
pub const DEFAULT_MAX_RANGE_DAYS: i64 = 366;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Upper bound on `end - start + 1` for instance generation.
    pub max_range_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}
