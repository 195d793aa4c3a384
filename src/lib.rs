pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::create_pool;
pub use error::ValidationError;
pub use service::{LedgerSyncer, SalesValidator, ValidationService};
