//! Terminal client for the professor rating service.

pub mod commands;
pub mod protocol;
pub mod session;

pub use commands::{parse, Command};
pub use protocol::{ApiClient, ClientError};
pub use session::{ProtocolState, SessionState};
