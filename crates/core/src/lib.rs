//! Scribe core types and utilities

pub mod error;
pub mod store;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult};
pub use store::{FileStore, MemoryStore, SessionStore};
pub use types::{TokenPair, Transcription, TranscriptionSource, User, UserProfile};
pub use validation::ValidationError;
