// ⚙️ Runtime configuration from environment variables

use std::env;
use std::path::PathBuf;

use crate::auth::AccessPolicy;

pub const DEFAULT_DB_PATH: &str = "adspend.db";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_STATIC_DIR: &str = "web";

#[derive(Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind_addr: String,
    /// Shared admin password; `None` leaves writes open
    pub admin_password: Option<String>,
    pub static_dir: PathBuf,
    pub log_json: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &self.db_path)
            .field("bind_addr", &self.bind_addr)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<set>"))
            .field("static_dir", &self.static_dir)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind_addr: DEFAULT_BIND.to_string(),
            admin_password: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup (tests pass a map instead of the
    /// process environment)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Config {
            db_path: lookup("ADSPEND_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            bind_addr: lookup("ADSPEND_BIND").unwrap_or(defaults.bind_addr),
            admin_password: lookup("ADSPEND_ADMIN_PASSWORD").filter(|p| !p.is_empty()),
            static_dir: lookup("ADSPEND_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            log_json: lookup("ADSPEND_LOG_JSON")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.log_json),
        }
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::from_optional(self.admin_password.as_deref())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
