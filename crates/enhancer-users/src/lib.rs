//! Per-user custom enhancer registry backed by a single JSON document.

pub mod error;
pub mod registry;
pub mod store;
pub mod types;

pub use error::RegistryError;
pub use registry::EnhancerRegistry;
pub use types::{CustomEnhancer, UserProfile};
