//! Typed environment variable lookups shared by the config loaders.

use std::env;
use std::str::FromStr;

/// Parses `key` as `T`; unset or unparsable values are `None`.
pub fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Boolean flag: `1/true/yes/on` or `0/false/no/off`, case-insensitive.
pub fn parse_env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|s| parse_bool(&s))
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
