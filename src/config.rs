//! Runtime configuration.
//!
//! Constants plus the few settings read from the environment (after `dotenv`
//! has loaded an optional `.env` file).

use crate::models::Prefix;

/// Display name of the root net.
pub const ROOT_NAME: &str = "The Internet";
/// Address space covered by the root net.
pub const ROOT_PREFIX: Prefix = Prefix::V4_ALL;
/// Default log4rs configuration file.
pub const LOG_CONFIG: &str = "log4rs.yml";

/// Environment variable overriding [`LOG_CONFIG`].
pub const ENV_LOG_CONFIG: &str = "NDIA_LOG_CONFIG";
/// Environment variable forcing the `all_hosts` render option.
pub const ENV_ALL_HOSTS: &str = "NDIA_ALL_HOSTS";

/// Settings gathered from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_config: String,
    pub all_hosts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_config: LOG_CONFIG.to_string(),
            all_hosts: false,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Settings {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        Settings {
            log_config: lookup(ENV_LOG_CONFIG).unwrap_or(defaults.log_config),
            all_hosts: lookup(ENV_ALL_HOSTS)
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.all_hosts),
        }
    }
}

/// Interpret an option value as a boolean flag.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
