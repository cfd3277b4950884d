use super::RequestsLoggingLevel;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub requests_logging_level: RequestsLoggingLevel,
    /// Number of recommendations requested from the music API
    pub recommendations_limit: u32,
    /// Sessions unused for longer than this are dropped
    pub session_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1".to_owned(),
            port: 5000,
            requests_logging_level: RequestsLoggingLevel::Path,
            recommendations_limit: 10,
            session_idle_timeout: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
