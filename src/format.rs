use std::time::Duration;

use chrono::{DateTime, Local};

/// Show elapsed time.
pub fn format_elapsed(d: Duration) -> String {
    let elapsed_time = d.as_secs_f64();

    if elapsed_time >= 3600.0 {
        let hours = elapsed_time / 3600.0;
        format!("{hours:.2}h")
    } else if elapsed_time >= 60.0 {
        let minutes = elapsed_time / 60.0;
        format!("{minutes:.2}min")
    } else {
        format!("{elapsed_time:.0}s")
    }
}

/// Show an RFC 3339 timestamp from the API in local time. Values that cannot
/// be parsed are shown as they are, a missing value as `-`.
pub fn format_time(time: Option<&str>) -> String {
    let Some(time) = time else {
        return String::from("-");
    };
    match DateTime::parse_from_rfc3339(time) {
        Ok(time) => time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Err(_) => time.to_string(),
    }
}
