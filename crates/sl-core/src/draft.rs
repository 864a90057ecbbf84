//! Admin edit-form input, before it becomes a [`TrackingEntry`].

use crate::tracking::{TimelineEvent, TrackingEntry, TrackingError, TrackingNumber, TrackingStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingDraft {
    pub number: String,
    pub status: TrackingStatus,
    pub status_text: String,
    pub origin: String,
    pub destination: String,
    pub estimated_delivery: String,
    pub package_type: String,
    pub weight: String,
    pub dimensions: String,
    pub insurance: String,
    pub timeline: Vec<TimelineEvent>,
}

impl TrackingDraft {
    /// Validates and normalises the draft. Text fields are trimmed, empty
    /// fields become `None`, timeline dates coming from a `datetime-local`
    /// style input (`2024-01-10T08:30`) are rewritten to `2024-01-10 08:30`.
    pub fn into_entry(self) -> Result<TrackingEntry, TrackingError> {
        let number = TrackingNumber::parse(&self.number)?;
        let timeline = self
            .timeline
            .into_iter()
            .map(|event| TimelineEvent {
                date: event.date.trim().replacen('T', " ", 1),
                title: event.title.trim().to_string(),
                description: event.description.trim().to_string(),
                location: event.location.trim().to_string(),
                active: event.active,
                blink: event.blink,
            })
            .collect();

        let entry = TrackingEntry {
            number,
            status: self.status,
            status_text: non_empty(self.status_text),
            origin: non_empty(self.origin),
            destination: non_empty(self.destination),
            estimated_delivery: non_empty(self.estimated_delivery),
            package_type: non_empty(self.package_type),
            weight: non_empty(self.weight),
            dimensions: non_empty(self.dimensions),
            insurance: non_empty(self.insurance),
            timeline,
        };
        Ok(entry.normalized())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
