//! Infrastructure layer for the client application.
//!
//! **Dependency rule**: this layer may depend on `application` and `c4_core`,
//! but MUST NOT be imported by the `application` layer.
//!
//! - **`network`** – WebSocket connection to the server and the frame loop
//!   that feeds the [`PlayerSession`](crate::application::PlayerSession).
//! - **`console`** – Terminal output for boards and notices, and the name
//!   prompt.

pub mod console;
pub mod network;

pub use console::ConsoleView;
pub use network::{run_client, ClientConfig};
