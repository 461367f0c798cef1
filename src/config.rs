//! Timer driver configuration.
//!
//! # Configuration Precedence
//!
//! 1. **Programmatic**: a [`TimerConfig`] passed to
//!    [`TimerDriver::new`](crate::time::TimerDriver::new)
//! 2. **Environment variables**: `ADHD_TIMER_*`, applied by
//!    [`TimerConfig::from_env`] for the process-wide driver
//! 3. **Defaults**: [`TimerConfig::default()`]
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `ADHD_TIMER_THREAD_NAME` | `String` | `thread_name` |
//! | `ADHD_TIMER_STACK_SIZE` | `usize` | `stack_size` |

use crate::tracing_compat::warn;

/// Environment variable name for the timer thread name.
pub const ENV_TIMER_THREAD_NAME: &str = "ADHD_TIMER_THREAD_NAME";
/// Environment variable name for the timer thread stack size.
pub const ENV_TIMER_STACK_SIZE: &str = "ADHD_TIMER_STACK_SIZE";

const DEFAULT_THREAD_NAME: &str = "adhd-timer";
const DEFAULT_STACK_SIZE: usize = 256 * 1024;

/// Error produced when a configuration override cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable is set to a value of the wrong shape.
    #[error("invalid value for {var}: expected {expected}, got {value:?}")]
    InvalidValue {
        /// The offending variable.
        var: &'static str,
        /// Human-readable description of the accepted values.
        expected: &'static str,
        /// The raw value that was rejected.
        value: String,
    },
}

/// Settings for the background thread that fires deadline timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    /// Name given to the timer thread.
    pub thread_name: String,
    /// Stack size of the timer thread, in bytes.
    pub stack_size: usize,
}

impl TimerConfig {
    /// Builds a config from defaults plus environment overrides.
    ///
    /// A malformed override is logged and ignored; the rest of the
    /// configuration still applies.
    #[must_use]
    #[cfg_attr(not(feature = "tracing-integration"), allow(unused_variables))]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Err(err) = apply_env_overrides(&mut config) {
            warn!(error = %err, "ignoring invalid timer configuration override");
        }
        config.normalize();
        config
    }

    /// Normalize configuration values to safe defaults.
    pub fn normalize(&mut self) {
        if self.thread_name.trim().is_empty() {
            self.thread_name = DEFAULT_THREAD_NAME.to_string();
        }
        if self.stack_size == 0 {
            self.stack_size = DEFAULT_STACK_SIZE;
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

/// Apply `ADHD_TIMER_*` environment overrides to a [`TimerConfig`].
///
/// Only variables that are set are applied. Returns an error if a variable
/// is set but contains an unparseable value.
pub fn apply_env_overrides(config: &mut TimerConfig) -> Result<(), ConfigError> {
    apply_overrides_with(config, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup` instead of the process environment.
pub fn apply_overrides_with<F>(config: &mut TimerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_TIMER_THREAD_NAME) {
        config.thread_name = val;
    }
    if let Some(val) = lookup(ENV_TIMER_STACK_SIZE) {
        config.stack_size = parse_usize(ENV_TIMER_STACK_SIZE, &val)?;
    }
    Ok(())
}

fn parse_usize(var: &'static str, val: &str) -> Result<usize, ConfigError> {
    val.trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidValue {
            var,
            expected: "unsigned integer",
            value: val.to_string(),
        })
}
