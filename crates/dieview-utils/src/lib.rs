//! # dieview Utilities
//!
//! Logging setup shared by the hosts that embed `dieview-core`.

pub mod logging;

pub use logging::{
    default_log_file, init_file_logging, init_logging, init_logging_with, init_logging_with_level, LogFormat,
    LogLevel, LoggingConfig, LoggingError, LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
