//! Channel-agnostic interaction pipeline.
//!
//! Channel adapters translate platform updates into [`InboundEvent`]s, wrap
//! the chat in a [`Transport`], and call [`route`].

pub mod action;
pub mod commands;
pub mod context;
pub mod pending;
pub mod render;
pub mod router;
pub mod transport;

pub use action::Action;
pub use commands::{Command, COMMANDS};
pub use context::EnhancerContext;
pub use router::{route, DisplayedMessage, InboundEvent};
pub use transport::{Button, Keyboard, MessageRef, Transport, TransportError};
