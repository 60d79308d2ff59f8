use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{AppError, AppResult};

/// Parse a client-supplied timestamp into UTC.
///
/// Date pickers send `YYYY-MM-DDTHH:MM` (sometimes with seconds, sometimes
/// with a space instead of the `T`); full RFC 3339 is accepted as well.
pub fn parse_client_datetime(raw: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let normalized = raw.trim().replace('T', " ");
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(AppError::BadRequest(format!(
        "Invalid datetime format: {}",
        raw
    )))
}
