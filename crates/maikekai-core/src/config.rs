use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `GOOGLE_PLACES_API_KEY=` in a .env file
    // does not masquerade as a configured credential.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("MAIKEKAI_ENV", "development"))?;

    let bind_addr = parse("MAIKEKAI_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("MAIKEKAI_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("MAIKEKAI_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("MAIKEKAI_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("MAIKEKAI_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let google_place_id = optional("GOOGLE_PLACE_ID");
    let google_places_api_key = optional("GOOGLE_PLACES_API_KEY");
    let reviews_proxy_url = optional("MAIKEKAI_REVIEWS_PROXY_URL")
        .unwrap_or_else(|| default_proxy_url(bind_addr));

    let http_timeout_secs = parse_u64("MAIKEKAI_HTTP_TIMEOUT_SECS", "15")?;
    let review_cache_ttl_secs = parse_u64("MAIKEKAI_REVIEW_CACHE_TTL_SECS", "300")?;
    let carousel_interval_ms = parse_u64("MAIKEKAI_CAROUSEL_INTERVAL_MS", "4000")?;
    if carousel_interval_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAIKEKAI_CAROUSEL_INTERVAL_MS".to_string(),
            reason: "interval must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        google_place_id,
        google_places_api_key,
        reviews_proxy_url,
        http_timeout_secs,
        review_cache_ttl_secs,
        carousel_interval_ms,
    })
}

/// The server's own proxy route, reached over loopback when bound to a
/// wildcard address.
fn default_proxy_url(bind_addr: SocketAddr) -> String {
    let ip = match bind_addr.ip() {
        IpAddr::V4(v4) if v4.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}", SocketAddr::new(ip, bind_addr.port()))
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MAIKEKAI_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
