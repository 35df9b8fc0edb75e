// Configuration module entry point
// Loads configuration from file and environment, exposes runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, GenerationConfig, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    RoutesConfig, ServerConfig, StorageConfig,
};

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `SERVER_*` environment variables override it,
    /// with `__` separating sections (`SERVER_STORAGE__OUTPUT_DIR`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Configuration made only of built-in defaults
    pub fn defaults() -> Result<Self, config::ConfigError> {
        with_defaults(config::Config::builder())?
            .build()?
            .try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn with_defaults(builder: Builder) -> Result<Builder, config::ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8000)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("logging.show_headers", false)?
        .set_default("logging.access_log_format", "combined")?
        .set_default("performance.keep_alive", true)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 30)?
        .set_default("performance.shutdown_timeout", 10)?
        .set_default("http.server_name", "deck-server/0.1")?
        .set_default("http.enable_cors", false)?
        .set_default("http.max_body_size", 10_485_760)? // 10MB
        .set_default("routes.health.enabled", true)?
        .set_default("routes.health.liveness_path", "/healthz")?
        .set_default("routes.health.readiness_path", "/readyz")?
        .set_default("storage.output_dir", "output")?
        .set_default("storage.templates_dir", "templates")?
        .set_default("storage.template_file", "template.potx")?
        .set_default("storage.output_file", "output.pptx")?
        .set_default("storage.unique_names", false)?
        .set_default("generation.max_slides", 500)?
        .set_default("generation.public_scheme", "https")?
        .set_default(
            "generation.preview_base_url",
            "https://view.officeapps.live.com/op/view.aspx?src=",
        )?
        .set_default("generation.default_title", "untitled")?
        .set_default("generation.default_content", "no content")
}
