use gemini_chat_core::ChatConfig;
use std::net::SocketAddr;

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn new(http_addr: SocketAddr, chat: ChatConfig) -> Self {
        Self { http_addr, chat }
    }
}
