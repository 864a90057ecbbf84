use crate::domain::MirrorSnapshot;

/// Anything that renders the admin listing from the mirror.
pub trait ListingView: Send + Sync {
    fn render(&self, snapshot: &MirrorSnapshot);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopView;

impl ListingView for NoopView {
    fn render(&self, _snapshot: &MirrorSnapshot) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingProgress {
    pub percent: u8,
    pub stage: usize,
    pub message: &'static str,
}

pub trait ProgressSink: Send + Sync {
    fn progress(&self, update: &LoadingProgress);
}

impl ProgressSink for NoopView {
    fn progress(&self, _update: &LoadingProgress) {}
}
