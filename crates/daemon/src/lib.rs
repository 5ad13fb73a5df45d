//! Status registry service: clients report the status of named machines
//! and query the latest known one. State is in memory only.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod registry;

pub use auth::ApiKeys;
pub use config::Config;
pub use error::ApiError;
pub use http::{build_router, serve, AppState};
pub use registry::Registry;
