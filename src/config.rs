use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub signing_key: String,
    pub reset: ResetSettings,
    pub cleanup_interval: std::time::Duration,
    pub log_level: String,
}

/// Tunables for issuing and validating reset requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetSettings {
    pub token_lifetime: Duration,
    pub selector_length: usize,
    pub verifier_length: usize,
    /// Minimum gap between two live requests for the same user.
    pub request_throttle: Option<Duration>,
    /// Purge expired requests before issuing a new one.
    pub garbage_collect: bool,
}

const MIN_TOKEN_PART: usize = 8;
const MAX_TOKEN_PART: usize = 64;
const MAX_WINDOW_DAYS: i64 = 365;

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            token_lifetime: Duration::hours(1),
            selector_length: 20,
            verifier_length: 20,
            request_throttle: None,
            garbage_collect: true,
        }
    }
}

impl ResetSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.token_lifetime <= Duration::zero() {
            return Err("Token lifetime must be positive".to_string());
        }
        if self.token_lifetime > Duration::days(MAX_WINDOW_DAYS) {
            return Err(format!(
                "Token lifetime must not exceed {MAX_WINDOW_DAYS} days"
            ));
        }
        for (name, len) in [
            ("selector", self.selector_length),
            ("verifier", self.verifier_length),
        ] {
            if !(MIN_TOKEN_PART..=MAX_TOKEN_PART).contains(&len) {
                return Err(format!(
                    "Invalid {name} length {len}: must be between {MIN_TOKEN_PART} and {MAX_TOKEN_PART}"
                ));
            }
        }
        if let Some(throttle) = self.request_throttle {
            if throttle < Duration::zero() {
                return Err("Request throttle must not be negative".to_string());
            }
            if throttle > Duration::days(MAX_WINDOW_DAYS) {
                return Err(format!(
                    "Request throttle must not exceed {MAX_WINDOW_DAYS} days"
                ));
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let signing_key = env_required("RESET_SIGNING_KEY")?;

        let token_lifetime = env_seconds(
            "RESET_TOKEN_LIFETIME_SECS",
            env_parse("RESET_TOKEN_LIFETIME_SECS", "3600")?,
        )?;
        let selector_length: usize = env_parse("RESET_SELECTOR_LENGTH", "20")?;
        let verifier_length: usize = env_parse("RESET_VERIFIER_LENGTH", "20")?;

        let request_throttle = match std::env::var("RESET_THROTTLE_SECS").ok() {
            Some(secs) if !secs.trim().is_empty() => Some(env_seconds(
                "RESET_THROTTLE_SECS",
                secs.trim()
                    .parse()
                    .map_err(|e| format!("Invalid RESET_THROTTLE_SECS: {e}"))?,
            )?),
            _ => None,
        };

        let garbage_collect = match env_or("RESET_GARBAGE_COLLECT", "true").as_str() {
            "false" | "0" | "no" => false,
            _ => true,
        };

        let cleanup_secs: u64 = env_parse("RESET_CLEANUP_INTERVAL_SECS", "300")?;
        if cleanup_secs == 0 {
            return Err("Invalid RESET_CLEANUP_INTERVAL_SECS: must be at least 1".to_string());
        }
        let cleanup_interval = std::time::Duration::from_secs(cleanup_secs);

        let log_level = env_or("RESET_LOG_LEVEL", "info");

        let reset = ResetSettings {
            token_lifetime,
            selector_length,
            verifier_length,
            request_throttle,
            garbage_collect,
        };
        reset.validate()?;

        Ok(Config {
            database_url,
            signing_key,
            reset,
            cleanup_interval,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or(key, default)
        .parse()
        .map_err(|e| format!("Invalid {key}: {e}"))
}

fn env_seconds(key: &str, secs: i64) -> Result<Duration, String> {
    Duration::try_seconds(secs).ok_or_else(|| format!("Invalid {key}: out of range"))
}
