use std::fmt;

/// Result of one remote call. Every failure mode is a distinct variant so
/// callers never mistake "nothing there" for "could not ask".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome<T> {
    Data(T),
    NotFound,
    Conflict(String),
    Rejected(String),
    Unreachable(String),
}

impl<T> RemoteOutcome<T> {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, RemoteOutcome::Unreachable(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RemoteOutcome<U> {
        match self {
            RemoteOutcome::Data(value) => RemoteOutcome::Data(f(value)),
            RemoteOutcome::NotFound => RemoteOutcome::NotFound,
            RemoteOutcome::Conflict(reason) => RemoteOutcome::Conflict(reason),
            RemoteOutcome::Rejected(reason) => RemoteOutcome::Rejected(reason),
            RemoteOutcome::Unreachable(reason) => RemoteOutcome::Unreachable(reason),
        }
    }

    /// Human readable reason for anything other than `Data`.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            RemoteOutcome::Data(_) => None,
            RemoteOutcome::NotFound => Some("not found".to_string()),
            RemoteOutcome::Conflict(reason) => Some(format!("conflict: {reason}")),
            RemoteOutcome::Rejected(reason) => Some(format!("rejected: {reason}")),
            RemoteOutcome::Unreachable(reason) => Some(format!("unreachable: {reason}")),
        }
    }
}

impl<T> fmt::Display for RemoteOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failure_reason() {
            Some(reason) => f.write_str(&reason),
            None => f.write_str("ok"),
        }
    }
}
