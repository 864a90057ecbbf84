pub mod mirror_backend;
pub mod presentation;
pub mod tracking_gateway;

pub use mirror_backend::MirrorBackend;
pub use presentation::{ListingView, LoadingProgress, NoopView, ProgressSink};
pub use tracking_gateway::TrackingGateway;
