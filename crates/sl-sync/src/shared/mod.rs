pub mod config;
pub mod error;

pub use config::{ClientConfig, MirrorLocation};
pub use error::AppError;
