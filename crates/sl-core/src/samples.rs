//! Built-in demo shipments shown when the backend has no record.

use std::collections::BTreeMap;

use crate::tracking::{TimelineEvent, TrackingEntry, TrackingNumber, TrackingStatus};

pub struct SampleCatalog {
    entries: BTreeMap<TrackingNumber, TrackingEntry>,
}

impl SampleCatalog {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let entries = builtin_entries()
            .into_iter()
            .map(|entry| (entry.number.clone(), entry))
            .collect();
        Self { entries }
    }

    pub fn get(&self, number: &TrackingNumber) -> Option<&TrackingEntry> {
        self.entries.get(number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SampleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

struct Sample<'a> {
    number: &'a str,
    status: TrackingStatus,
    origin: &'a str,
    destination: &'a str,
    estimated_delivery: &'a str,
    package_type: &'a str,
    weight: &'a str,
    dimensions: &'a str,
    insurance: &'a str,
    timeline: &'a [(&'a str, &'a str, &'a str, &'a str, bool)],
}

impl Sample<'_> {
    fn build(&self) -> Option<TrackingEntry> {
        let number = TrackingNumber::parse(self.number).ok()?;
        Some(TrackingEntry {
            number,
            status: self.status,
            status_text: Some(self.status.label().to_string()),
            origin: Some(self.origin.to_string()),
            destination: Some(self.destination.to_string()),
            estimated_delivery: Some(self.estimated_delivery.to_string()),
            package_type: Some(self.package_type.to_string()),
            weight: Some(self.weight.to_string()),
            dimensions: Some(self.dimensions.to_string()),
            insurance: Some(self.insurance.to_string()),
            timeline: self
                .timeline
                .iter()
                .map(|(date, title, description, location, active)| TimelineEvent {
                    date: date.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    location: location.to_string(),
                    active: *active,
                    blink: false,
                })
                .collect(),
        })
    }
}

fn builtin_entries() -> Vec<TrackingEntry> {
    [
        Sample {
            number: "MD123456789",
            status: TrackingStatus::InTransit,
            origin: "New York, NY",
            destination: "Los Angeles, CA",
            estimated_delivery: "2024-01-15",
            package_type: "Express Delivery",
            weight: "2.5 kg",
            dimensions: "30 x 20 x 15 cm",
            insurance: "Yes - $500 coverage",
            timeline: &[
                ("2024-01-10 08:30", "Package Picked Up", "Package has been picked up from sender at New York, NY", "New York, NY", true),
                ("2024-01-10 14:15", "In Transit", "Package is in transit to destination", "In Transit", true),
                ("2024-01-11 09:45", "Arrived at Sorting Facility", "Package arrived at sorting facility in Chicago", "Chicago, IL", true),
                ("2024-01-12 11:20", "Out for Delivery", "Package is out for delivery", "Los Angeles, CA", false),
                ("2024-01-15 10:00", "Delivered", "Package has been delivered to recipient", "Los Angeles, CA", false),
            ],
        },
        Sample {
            number: "MD987654321",
            status: TrackingStatus::Delivered,
            origin: "Miami, FL",
            destination: "Seattle, WA",
            estimated_delivery: "2024-01-08",
            package_type: "Standard Delivery",
            weight: "1.8 kg",
            dimensions: "25 x 18 x 12 cm",
            insurance: "Yes - $300 coverage",
            timeline: &[
                ("2024-01-05 10:00", "Package Picked Up", "Package has been picked up from sender at Miami, FL", "Miami, FL", true),
                ("2024-01-06 15:30", "In Transit", "Package is in transit to destination", "In Transit", true),
                ("2024-01-07 13:15", "Arrived at Sorting Facility", "Package arrived at sorting facility in Denver", "Denver, CO", true),
                ("2024-01-08 08:45", "Out for Delivery", "Package is out for delivery", "Seattle, WA", true),
                ("2024-01-08 14:30", "Delivered", "Package has been delivered to recipient", "Seattle, WA", true),
            ],
        },
        Sample {
            number: "MD555666777",
            status: TrackingStatus::Pending,
            origin: "Boston, MA",
            destination: "San Francisco, CA",
            estimated_delivery: "2024-01-20",
            package_type: "Premium Delivery",
            weight: "5.2 kg",
            dimensions: "40 x 30 x 25 cm",
            insurance: "Yes - $1000 coverage",
            timeline: &[
                ("2024-01-13 09:00", "Package Received", "Package received at our facility", "Boston, MA", true),
                ("2024-01-14 10:30", "Processing", "Package is being processed for shipment", "Boston, MA", false),
                ("2024-01-15 08:00", "Scheduled for Pickup", "Package scheduled for pickup", "Boston, MA", false),
                ("2024-01-16 09:00", "In Transit", "Package will be in transit", "In Transit", false),
                ("2024-01-20 10:00", "Estimated Delivery", "Estimated delivery date", "San Francisco, CA", false),
            ],
        },
    ]
    .iter()
    .filter_map(Sample::build)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_contains_demo_numbers() {
        let catalog = SampleCatalog::builtin();
        assert_eq!(catalog.len(), 3);

        let number = TrackingNumber::parse("md987654321").unwrap();
        let entry = catalog.get(&number).expect("sample present");
        assert_eq!(entry.status, TrackingStatus::Delivered);
        assert_eq!(entry.timeline.len(), 5);
        assert!(entry.timeline.iter().all(|event| event.active));
    }

    #[test]
    fn empty_catalog_has_no_entries() {
        let catalog = SampleCatalog::empty();
        assert!(catalog.is_empty());
        assert!(catalog
            .get(&TrackingNumber::parse("MD123456789").unwrap())
            .is_none());
    }
}
