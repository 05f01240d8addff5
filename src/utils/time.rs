use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn from_rfc3339(s: &str) -> crate::error::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| crate::error::Error::BadRequest(format!("Invalid timestamp '{}': {}", s, e)))
}

pub fn unix_seconds(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}
