//! Timestamp utilities

use chrono::Utc;

/// Milliseconds since the Unix epoch, used for generated placeholder names
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
