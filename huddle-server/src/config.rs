use std::env;

/// Server configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (`PORT`, default 3001).
    pub port: u16,
    /// Allowed CORS origin for the web client (`CLIENT_URL`).
    pub client_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);
        let client_url =
            env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self { port, client_url }
    }
}
