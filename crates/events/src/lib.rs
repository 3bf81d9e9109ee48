//! `sara-events`: in-process notifications between the client layers.
//!
//! The network layer publishes, the UI/router layers subscribe. Nothing here
//! knows what a session or a route is.

pub mod bus;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
