// stocklink-api: Async Rust client for the AIStockLink REST backend

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod storage;
pub mod transport;

pub use auth::BearerToken;
pub use client::{ApiClient, RequestOptions};
pub use error::Error;
pub use models::{Envelope, Payload};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError};
pub use transport::TransportConfig;
