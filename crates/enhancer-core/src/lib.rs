pub mod config;
pub mod error;
pub mod types;

pub use config::EnhancerConfig;
pub use error::{EnhancerError, Result};
