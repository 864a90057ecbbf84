//! Display projection of a tracking entry for the public tracking page.

use serde::Serialize;

use crate::tracking::{TrackingEntry, TrackingStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    pub date: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub active: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingView {
    pub number: String,
    pub status: TrackingStatus,
    pub status_text: String,
    pub details: Vec<DetailRow>,
    pub timeline: Vec<TimelineRow>,
}

impl TrackingView {
    pub fn from_entry(entry: &TrackingEntry) -> Self {
        let details = [
            ("Origin", &entry.origin),
            ("Destination", &entry.destination),
            ("Estimated Delivery", &entry.estimated_delivery),
            ("Package Type", &entry.package_type),
            ("Weight", &entry.weight),
            ("Dimensions", &entry.dimensions),
            ("Insurance", &entry.insurance),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then(|| DetailRow {
                label,
                value: value.to_string(),
            })
        })
        .collect();

        // An explicit blink anywhere suppresses the implicit "latest active" highlight.
        let any_blink = entry.timeline.iter().any(|event| event.blink);
        let last_active = entry.timeline.iter().rposition(|event| event.active);

        let timeline = entry
            .timeline
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let wants_highlight = event.blink || (!any_blink && last_active == Some(index));
                TimelineRow {
                    date: event.date.clone(),
                    title: event.title.clone(),
                    description: event.description.clone(),
                    location: event.location.clone(),
                    active: event.active,
                    highlighted: wants_highlight && event.active,
                }
            })
            .collect();

        Self {
            number: entry.number.to_string(),
            status: entry.status,
            status_text: entry.status_label().to_string(),
            details,
            timeline,
        }
    }
}
