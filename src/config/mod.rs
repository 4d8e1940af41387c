// Configuration module entry point
// Loads layered configuration and builds the immutable runtime state

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Default config file name (without extension), looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "lanserve";

/// Directory next to the executable that holds the site
pub const BASE_DIR_NAME: &str = "src";

impl Config {
    /// Load configuration from the default file location
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. With no file and no `LANSERVE_*` variables the
    /// defaults below are used as-is.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("LANSERVE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.index_file", "index.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("http.server_name", "lanserve")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        self.server
            .host
            .parse::<IpAddr>()
            .map(|ip| SocketAddr::new(ip, self.server.port))
            .map_err(|e| format!("Invalid address '{}': {e}", self.server.host))
    }

    /// Compute the base directory once at startup.
    ///
    /// Defaults to `src` beside the running executable. The directory does
    /// not have to exist yet; missing files are reported per request.
    pub fn resolve_base_dir(&self) -> std::io::Result<PathBuf> {
        if let Some(dir) = &self.server.base_dir {
            return Ok(PathBuf::from(dir));
        }

        let exe = std::env::current_exe()?;
        let exe_dir = exe.parent().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Executable has no parent directory: {}", exe.display()),
            )
        })?;
        Ok(exe_dir.join(BASE_DIR_NAME))
    }
}
