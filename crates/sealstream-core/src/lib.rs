pub mod config;
pub mod error;
pub mod layout;

pub use config::StreamConfig;
pub use error::{SealError, SealResult, Segment};
