use crate::application::ports::TrackingGateway;
use crate::domain::RemoteOutcome;
use sl_core::ContactInfo;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactSaveOutcome {
    Saved(ContactInfo),
    Failed { reason: String },
}

impl ContactSaveOutcome {
    pub fn notice(&self) -> String {
        match self {
            ContactSaveOutcome::Saved(_) => "Contact info saved".to_string(),
            ContactSaveOutcome::Failed { reason } => format!("Contact info not saved ({reason})"),
        }
    }
}

/// Company contact details. Unlike tracking entries these are never
/// mirrored: a failed save leaves the displayed values as they were.
pub struct ContactDesk {
    gateway: Arc<dyn TrackingGateway>,
    displayed: RwLock<ContactInfo>,
}

impl ContactDesk {
    pub fn new(gateway: Arc<dyn TrackingGateway>) -> Self {
        Self {
            gateway,
            displayed: RwLock::new(ContactInfo::default()),
        }
    }

    pub async fn displayed(&self) -> ContactInfo {
        self.displayed.read().await.clone()
    }

    /// Fetches the stored contact info. When the remote store cannot be
    /// reached the previously displayed values are returned.
    pub async fn load(&self) -> ContactInfo {
        match self.gateway.get_contact().await {
            RemoteOutcome::Data(info) => {
                *self.displayed.write().await = info.clone();
                info
            }
            other => {
                tracing::warn!(reason = %other, "contact info unavailable");
                self.displayed().await
            }
        }
    }

    pub async fn save(&self, info: ContactInfo) -> ContactSaveOutcome {
        let info = info.trimmed();
        match self.gateway.save_contact(&info).await {
            RemoteOutcome::Data(stored) => {
                *self.displayed.write().await = stored.clone();
                tracing::info!("contact info saved");
                ContactSaveOutcome::Saved(stored)
            }
            other => {
                let reason = other.to_string();
                tracing::warn!(%reason, "contact info save failed");
                ContactSaveOutcome::Failed { reason }
            }
        }
    }

    pub async fn clear(&self) -> ContactSaveOutcome {
        self.save(ContactInfo::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeGateway;

    fn info() -> ContactInfo {
        ContactInfo {
            address: " 1 Harbor Way ".into(),
            phone: "555-0100".into(),
            email: "ops@example.com".into(),
            hours: "9-5".into(),
        }
    }

    #[tokio::test]
    async fn save_trims_and_updates_display() {
        let gateway = FakeGateway::new();
        let desk = ContactDesk::new(gateway.clone());

        let outcome = desk.save(info()).await;

        assert!(matches!(outcome, ContactSaveOutcome::Saved(_)));
        assert_eq!(desk.displayed().await.address, "1 Harbor Way");
        assert_eq!(gateway.contact().address, "1 Harbor Way");
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_display() {
        let gateway = FakeGateway::new();
        let desk = ContactDesk::new(gateway.clone());
        desk.save(info()).await;

        gateway.set_offline(true);
        let outcome = desk.clear().await;

        assert!(matches!(outcome, ContactSaveOutcome::Failed { .. }));
        assert!(outcome.notice().contains("not saved"));
        assert_eq!(desk.displayed().await.phone, "555-0100");
        assert_eq!(desk.load().await.phone, "555-0100");
    }

    #[tokio::test]
    async fn clear_blanks_every_field() {
        let gateway = FakeGateway::new();
        let desk = ContactDesk::new(gateway.clone());
        desk.save(info()).await;

        desk.clear().await;

        assert!(desk.load().await.is_empty());
        assert!(gateway.contact().is_empty());
    }
}
