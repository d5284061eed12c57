use std::time::Duration;

use crate::domain::LlmError;

pub const ENV_ENDPOINT_URL: &str = "WAYFARER_ENDPOINT_URL";
pub const ENV_MODEL: &str = "WAYFARER_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "WAYFARER_TIMEOUT_SECS";
pub const ENV_USERS_FILE: &str = "WAYFARER_USERS_FILE";

pub fn read_env_var(name: &str) -> Result<Option<String>, LlmError> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(LlmError::validation(format!(
            "{name} could not be read: {error}"
        ))),
    }
}

pub fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, LlmError> {
    let parsed = value.trim().parse::<u64>().map_err(|_| {
        LlmError::validation(format!("{name} must be a positive integer in seconds"))
    })?;
    if parsed == 0 {
        return Err(LlmError::validation(format!(
            "{name} must be greater than 0 seconds"
        )));
    }
    Ok(Duration::from_secs(parsed))
}

pub fn read_timeout_from_env(name: &str) -> Result<Option<Duration>, LlmError> {
    let Some(value) = read_env_var(name)? else {
        return Ok(None);
    };
    Ok(Some(parse_timeout_seconds(name, &value)?))
}

/// Explicit value first, then the lazily read environment value, then `default`.
pub fn resolve_with_env_fallback<T, F>(
    explicit: Option<T>,
    read_env: F,
    default: T,
) -> Result<T, LlmError>
where
    F: FnOnce() -> Result<Option<T>, LlmError>,
{
    if let Some(value) = explicit {
        return Ok(value);
    }

    Ok(read_env()?.unwrap_or(default))
}
