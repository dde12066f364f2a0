//! Timestamp helpers shared by every store.

use chrono::{DateTime, SubsecRound, Utc};

/// Current UTC time truncated to microseconds.
///
/// PostgreSQL `TIMESTAMPTZ` keeps microsecond precision; every store stamps
/// records with this so a saved aggregate compares equal after a reload.
pub fn storage_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
