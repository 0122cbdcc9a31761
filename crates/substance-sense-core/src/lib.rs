pub mod chat;
pub mod config;
pub mod predict;
pub mod state;

// Re-export main types for convenience
pub use chat::{ChatSession, Submission};
pub use config::{Config, ConfigError};
pub use predict::{PredictError, PredictionClient};
pub use state::{Message, Sender, Transcript};
