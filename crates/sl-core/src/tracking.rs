use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    #[error("Tracking number required")]
    EmptyNumber,
    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

/// Primary key of a tracking entry. Always trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingNumber(String);

impl TrackingNumber {
    pub fn parse(raw: &str) -> Result<Self, TrackingError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(TrackingError::EmptyNumber);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TrackingNumber {
    type Error = TrackingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TrackingNumber> for String {
    fn from(value: TrackingNumber) -> Self {
        value.0
    }
}

impl FromStr for TrackingNumber {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingStatus {
    #[default]
    Pending,
    InTransit,
    Delivered,
}

impl TrackingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::Pending => "pending",
            TrackingStatus::InTransit => "in-transit",
            TrackingStatus::Delivered => "delivered",
        }
    }

    /// Canonical human-readable label used when an entry carries no `statusText`.
    pub fn label(&self) -> &'static str {
        match self {
            TrackingStatus::Pending => "Pending",
            TrackingStatus::InTransit => "In Transit",
            TrackingStatus::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackingStatus {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(TrackingStatus::Pending),
            "in-transit" => Ok(TrackingStatus::InTransit),
            "delivered" => Ok(TrackingStatus::Delivered),
            other => Err(TrackingError::UnknownStatus(other.to_string())),
        }
    }
}

/// A milestone in a shipment's history. `date` is kept as free text,
/// canonically `YYYY-MM-DD HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TimelineEvent {
    pub date: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub active: bool,
    pub blink: bool,
}

impl TimelineEvent {
    /// True when every descriptive field is empty. Blank events are never
    /// persisted; whitespace counts as content.
    pub fn is_blank(&self) -> bool {
        [&self.date, &self.title, &self.description, &self.location]
            .iter()
            .all(|value| value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEntry {
    pub number: TrackingNumber,
    pub status: TrackingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<String>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}

impl TrackingEntry {
    pub fn new(number: TrackingNumber, status: TrackingStatus) -> Self {
        Self {
            number,
            status,
            status_text: None,
            origin: None,
            destination: None,
            estimated_delivery: None,
            package_type: None,
            weight: None,
            dimensions: None,
            insurance: None,
            timeline: Vec::new(),
        }
    }

    /// Fills the status label from the status when it is absent or blank and
    /// drops blank timeline events. Timeline order is preserved.
    pub fn normalized(mut self) -> Self {
        let has_label = self
            .status_text
            .as_deref()
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false);
        if !has_label {
            self.status_text = Some(self.status.label().to_string());
        }
        self.timeline.retain(|event| !event.is_blank());
        self
    }

    pub fn status_label(&self) -> &str {
        match self.status_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => self.status.label(),
        }
    }
}
