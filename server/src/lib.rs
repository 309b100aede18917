//! HTTP front end for the Gemini chat core. Every session owns its own turn
//! store; nothing is shared between sessions except the API client.

pub mod config;
pub mod http_server;
pub mod session;
