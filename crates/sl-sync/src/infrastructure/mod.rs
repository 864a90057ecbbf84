pub mod gateway;
pub mod mirror;
