//! Session management

pub mod id;
pub mod registry;
pub mod state;

// Re-export key types for convenience
pub use id::{SessionId, SessionIdGenerator, UuidGenerator};
pub use registry::{DEFAULT_MAX_CREATE_ATTEMPTS, SessionRegistry};
pub use state::{Session, SessionSnapshot};
