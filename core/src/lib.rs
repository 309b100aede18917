// Core Gemini chat functionality:
// - Turn store for one chat session
// - Request/response data structures
// - API client
// - Exchange reducer folding replies back into the turn store
// - Configuration loading
// - Shared error types

// Export turn module - Turns and the per-session turn store
pub mod turn;
pub use turn::*;

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export client module - API client for Gemini
pub mod client;
pub use client::*;

// Export exchange module - One user turn in, one assistant turn out
pub mod exchange;
pub use exchange::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;
