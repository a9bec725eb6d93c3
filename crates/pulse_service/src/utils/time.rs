use chrono::Utc;

pub const HOUR_MILLIS: i64 = 3_600_000;

#[inline]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
