//! Value parsers for flags that carry more than a plain string.

use sl_core::{TimelineEvent, TrackingStatus};

pub fn parse_status(value: &str) -> Result<TrackingStatus, String> {
    value.parse().map_err(|err: sl_core::TrackingError| {
        format!("{err} (expected pending, in-transit or delivered)")
    })
}

/// Parses `date|title|description|location[|done][|blink]`.
pub fn parse_event(value: &str) -> Result<TimelineEvent, String> {
    let parts: Vec<&str> = value.split('|').map(str::trim).collect();
    if parts.len() < 4 {
        return Err(format!(
            "event needs date|title|description|location, got {value:?}"
        ));
    }

    let mut event = TimelineEvent {
        date: parts[0].to_string(),
        title: parts[1].to_string(),
        description: parts[2].to_string(),
        location: parts[3].to_string(),
        ..Default::default()
    };
    for flag in &parts[4..] {
        match flag.to_ascii_lowercase().as_str() {
            "done" | "active" => event.active = true,
            "blink" => event.blink = true,
            "" => {}
            other => return Err(format!("unknown event flag {other:?}")),
        }
    }
    Ok(event)
}
