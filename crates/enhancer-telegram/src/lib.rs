pub mod adapter;
pub mod callback;
pub mod error;
pub mod handler;
pub mod send;
pub mod transport;

pub use adapter::{AdapterSettings, TelegramAdapter};
pub use error::TelegramError;
pub use transport::TelegramTransport;
