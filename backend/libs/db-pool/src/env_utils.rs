//! Environment variable parsing helpers
//!
//! Unlike a plain `.ok().and_then(parse)` chain, a variable that is present but
//! unparsable is reported as an error instead of silently falling back.

use std::str::FromStr;

/// Read `key`, returning `default` when it is unset or blank.
///
/// # Example
/// ```ignore
/// let max: u32 = parse_env_or("DB_MAX_CONNECTIONS", 10)?;
/// ```
pub fn parse_env_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

/// Read a boolean flag. Accepts `true/false`, `1/0`, `yes/no` (case-insensitive).
pub fn parse_flag_or(key: &str, default: bool) -> Result<bool, String> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(format!("Failed to parse {}='{}' as a flag", key, other)),
        },
        Err(_) => Ok(default),
    }
}
