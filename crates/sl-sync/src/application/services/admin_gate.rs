use crate::shared::error::AppError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPanel {
    Tracking,
    Contact,
}

impl fmt::Display for AdminPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdminPanel::Tracking => "tracking",
            AdminPanel::Contact => "contact",
        })
    }
}

impl FromStr for AdminPanel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tracking" => Ok(AdminPanel::Tracking),
            "contact" => Ok(AdminPanel::Contact),
            other => Err(AppError::validation(format!("Unknown admin panel: {other}"))),
        }
    }
}

/// Shared-passphrase gate in front of the admin panels. It keeps casual
/// visitors out of the editing UI and nothing more; the API itself is open.
#[derive(Clone)]
pub struct AdminGate {
    passphrase: String,
}

impl AdminGate {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    /// Runs `on_unlock` with the requested panel when `attempt` matches.
    pub fn unlock<F>(&self, panel: AdminPanel, attempt: &str, on_unlock: F) -> Result<(), AppError>
    where
        F: FnOnce(AdminPanel),
    {
        if attempt != self.passphrase {
            tracing::warn!(%panel, "admin unlock refused");
            return Err(AppError::Unauthorized("Incorrect password".to_string()));
        }
        on_unlock(panel);
        Ok(())
    }
}

impl fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGate").finish_non_exhaustive()
    }
}
