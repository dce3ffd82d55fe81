//! Logging setup controlled by environment variables.
//!
//! # Environment Variables
//!
//! - `SQP_DEBUG=true|1|yes` - Enable debug logging
//! - `SQP_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific log level
//! - `SQP_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! Installing a subscriber needs the `tracing-subscriber` feature. Without it
//! [`init`] does nothing and events go to whatever subscriber the
//! application installed.
//!
//! [`init_from`] also honours `log_level` from the `[debug]` section of
//! `sqp.toml` when neither variable is set.
//!
//! ```rust,no_run
//! use sqp_query::logging;
//!
//! // Call once at startup
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

use sqp_schema::DebugConfig;

static INIT: Once = Once::new();

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check if debug logging is enabled via `SQP_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SQP_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the log level from `SQP_LOG_LEVEL`.
///
/// Falls back to "debug" when `SQP_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let env_level = env::var("SQP_LOG_LEVEL").ok();
    select_level(env_level.as_deref(), is_debug_enabled(), None).unwrap_or("warn")
}

/// Pick the level to install, or `None` to leave logging off.
///
/// `SQP_LOG_LEVEL` wins, then `SQP_DEBUG`, then the level from `[debug]` in
/// `sqp.toml`. An unknown environment level falls back to "debug" or "warn";
/// an unknown configured level is ignored.
pub fn select_level(
    env_level: Option<&str>,
    debug_enabled: bool,
    configured: Option<&str>,
) -> Option<&'static str> {
    let known = |level: &str| {
        let level = level.to_lowercase();
        LEVELS.iter().copied().find(|l| *l == level)
    };

    match (env_level, configured) {
        (Some(level), _) => {
            let fallback = if debug_enabled { "debug" } else { "warn" };
            Some(known(level).unwrap_or(fallback))
        }
        (None, _) if debug_enabled => Some("debug"),
        (None, Some(level)) => known(level),
        (None, None) => None,
    }
}

/// Get the output format from `SQP_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var("SQP_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Build the filter directive for the sqp crates at `level`.
pub fn filter_directive(level: &str) -> String {
    ["sqp", "sqp_query", "sqp_schema", "sqp_axum"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize logging from the environment. Subsequent calls are no-ops.
///
/// Nothing is installed unless `SQP_DEBUG` or `SQP_LOG_LEVEL` is set.
pub fn init() {
    install(None);
}

/// Initialize logging, using `config.log_level` when the environment sets
/// no level. Subsequent calls are no-ops.
///
/// ```rust,no_run
/// use sqp_query::logging;
/// use sqp_schema::SqpConfig;
///
/// let config = SqpConfig::from_file("sqp.toml").unwrap();
/// logging::init_from(&config.debug);
/// ```
pub fn init_from(config: &DebugConfig) {
    install(config.log_level.as_deref());
}

fn install(configured: Option<&str>) {
    INIT.call_once(|| {
        let env_level = env::var("SQP_LOG_LEVEL").ok();
        let Some(level) = select_level(env_level.as_deref(), is_debug_enabled(), configured)
        else {
            return;
        };

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(filter_directive(level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = get_log_format(), "sqp logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        let _ = level;
    });
}
