// Application state module
// Immutable values shared by every connection

use super::types::Config;
use crate::handler::static_files::StaticRoot;
use crate::logger::AccessLogFormat;

/// Application state
///
/// Built once in `main` and handed to each connection behind an `Arc`.
pub struct AppState {
    pub config: Config,
    pub root: StaticRoot,
    /// `logging.access_log_format`, parsed once
    pub access_log_format: AccessLogFormat,
}

impl AppState {
    pub fn new(config: Config, root: StaticRoot) -> Self {
        let access_log_format = AccessLogFormat::parse(&config.logging.access_log_format);
        Self {
            config,
            root,
            access_log_format,
        }
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
