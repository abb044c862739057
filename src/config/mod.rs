// Configuration module entry point
// Layered load: defaults, then config.toml, then DISPATCH_* environment overrides

mod types;

use std::net::SocketAddr;

pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StoreBackend, StoreConfig,
};

impl Config {
    /// Load configuration from the default `config.toml` location.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("DISPATCH").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB, bodies are small JSON
            .set_default("store.backend", "remote")?
            .set_default("store.workbook", "FleetDispatch")?
            .set_default("store.credentials_file", "credentials.json")?
            .set_default("store.jobs_sheet", "Jobs")?
            .set_default("store.drivers_sheet", "Drivers")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
