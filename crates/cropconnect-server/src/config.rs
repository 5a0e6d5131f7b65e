// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

use cropconnect_core::{
    DEFAULT_DB_PATH, ENV_CROPCONNECT_DB_PATH, ENV_CROPCONNECT_LOG_JSON,
    ENV_CROPCONNECT_SESSION_SECRET,
};
use cropconnect_lifecycle::LifecyclePolicy;

pub const ENV_CROPCONNECT_BIND: &str = "CROPCONNECT_BIND";
pub const ENV_CROPCONNECT_SESSION_TTL_SECS: &str = "CROPCONNECT_SESSION_TTL_SECS";
pub const ENV_CROPCONNECT_MAX_BODY_BYTES: &str = "CROPCONNECT_MAX_BODY_BYTES";
pub const ENV_CROPCONNECT_REQUEST_TIMEOUT_MS: &str = "CROPCONNECT_REQUEST_TIMEOUT_MS";
pub const ENV_CROPCONNECT_SHUTDOWN_DRAIN_MS: &str = "CROPCONNECT_SHUTDOWN_DRAIN_MS";

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Per-request limits applied by the router.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
            request_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub db_path: PathBuf,
    pub session_secret: String,
    /// Set when no secret was configured and an ephemeral one was generated.
    pub session_secret_generated: bool,
    pub session_ttl: Duration,
    pub log_json: bool,
    pub shutdown_drain: Duration,
    pub api: ApiConfig,
    pub policy: LifecyclePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            session_secret: String::new(),
            session_secret_generated: false,
            session_ttl: Duration::from_secs(86_400),
            log_json: true,
            shutdown_drain: Duration::from_millis(2_000),
            api: ApiConfig::default(),
            policy: LifecyclePolicy::default(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; unparsable values fall
    /// back to the defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Env(&lookup);
        let defaults = Self::default();

        let configured_secret = env
            .string(ENV_CROPCONNECT_SESSION_SECRET)
            .filter(|s| !s.trim().is_empty());
        let session_secret_generated = configured_secret.is_none();
        let session_secret = configured_secret.unwrap_or_else(generate_secret);

        Self {
            bind: env
                .string(ENV_CROPCONNECT_BIND)
                .unwrap_or(defaults.bind),
            db_path: env
                .string(ENV_CROPCONNECT_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            session_secret,
            session_secret_generated,
            session_ttl: Duration::from_secs(
                env.u64(ENV_CROPCONNECT_SESSION_TTL_SECS, defaults.session_ttl.as_secs()),
            ),
            log_json: env.bool(ENV_CROPCONNECT_LOG_JSON, defaults.log_json),
            shutdown_drain: env.duration_ms(ENV_CROPCONNECT_SHUTDOWN_DRAIN_MS, 2_000),
            api: ApiConfig {
                max_body_bytes: env
                    .usize(ENV_CROPCONNECT_MAX_BODY_BYTES, defaults.api.max_body_bytes),
                request_timeout: env.duration_ms(ENV_CROPCONNECT_REQUEST_TIMEOUT_MS, 5_000),
            },
            policy: LifecyclePolicy::from_lookup(&lookup),
        }
    }
}

fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }

    fn bool(&self, name: &str, default: bool) -> bool {
        self.string(name)
            .and_then(|v| match v.as_str() {
                "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
                "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
                _ => None,
            })
            .unwrap_or(default)
    }

    fn u64(&self, name: &str, default: u64) -> u64 {
        self.string(name)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(default)
    }

    fn usize(&self, name: &str, default: usize) -> usize {
        self.string(name)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(default)
    }

    fn duration_ms(&self, name: &str, default_ms: u64) -> Duration {
        Duration::from_millis(self.u64(name, default_ms))
    }
}
