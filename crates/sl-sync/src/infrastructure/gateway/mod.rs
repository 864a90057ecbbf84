mod http;

pub use http::HttpTrackingGateway;
