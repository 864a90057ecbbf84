pub mod config;
pub mod contact;
pub mod db;
pub mod draft;
pub mod http;
pub mod logging;
pub mod samples;
pub mod server;
pub mod tracking;
pub mod view;

pub use contact::ContactInfo;
pub use draft::TrackingDraft;
pub use samples::SampleCatalog;
pub use tracking::{TimelineEvent, TrackingEntry, TrackingError, TrackingNumber, TrackingStatus};
pub use view::TrackingView;
