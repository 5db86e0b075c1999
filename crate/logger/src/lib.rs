pub use log_utils::{DEFAULT_LOG_LEVEL, log_init};
// re-export the tracing macros so that callers only depend on this crate for logging
pub use tracing::{debug, error, info, trace, warn};

mod log_utils;
