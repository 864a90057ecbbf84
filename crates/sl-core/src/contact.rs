use serde::{Deserialize, Serialize};

/// Singleton company contact record. Each save replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContactInfo {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub hours: String,
}

impl ContactInfo {
    pub fn trimmed(self) -> Self {
        Self {
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            hours: self.hours.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
            && self.phone.is_empty()
            && self.email.is_empty()
            && self.hours.is_empty()
    }
}
