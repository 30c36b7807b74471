use chrono::{DateTime, Duration, TimeZone, Utc};

/// Format a duration as "HH:MM:SS", hours are not wrapped at 24
pub fn format_elapsed_time(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().unsigned_abs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Time since `time`, formatted by [`format_elapsed_time`]
pub fn format_time_as_elapsed<Tz>(time: DateTime<Tz>) -> String
where
    Tz: TimeZone,
{
    format_elapsed_time(Utc::now().signed_duration_since(time))
}
