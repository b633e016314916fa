// wyzely-api: Async Rust client for the Wyze cloud device-control API

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod generation;
pub mod models;
pub mod session;
pub mod token_store;
pub mod transport;

pub use client::DeviceClient;
pub use config::{ApiConfig, Credentials};
pub use error::Error;
pub use generation::ApiGeneration;
pub use session::SessionManager;
