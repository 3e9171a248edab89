use thiserror::Error;
use time::Date;

use comedor_shared::InvalidHourMinute;
use comedor_shared::session::SessionError;
use comedor_store::StoreError;

/// Failures the engine surfaces to its caller. Lookup gaps during grid
/// construction never appear here: they degrade the affected cell and
/// are logged instead.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{0}")]
    Validate(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidTime(#[from] InvalidHourMinute),

    #[error("residence {0} not found")]
    ResidenceNotFound(String),

    #[error("{count} weekly selections exist for user {user_id}")]
    DuplicateWeeklySelection { user_id: String, count: usize },

    #[error("multiple slot overrides for group {group} on {date}")]
    DuplicateSlotOverride { date: Date, group: String },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
