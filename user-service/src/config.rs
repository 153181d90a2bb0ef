use std::env;

use anyhow::{bail, Context, Result};

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub token_leeway_seconds: u32,
}

/// Reads the auth configuration from the environment.
///
/// The signing secret is load-bearing for every token this service issues
/// or accepts, so a missing or empty `AUTH_JWT_SECRET` refuses to boot
/// instead of degrading at runtime.
pub fn load_auth_config() -> Result<AuthConfig> {
    let jwt_secret = env::var("AUTH_JWT_SECRET")
        .context("AUTH_JWT_SECRET must be set before the service can start")?;
    if jwt_secret.trim().is_empty() {
        bail!("AUTH_JWT_SECRET must not be empty");
    }

    let token_ttl_seconds = match env::var("AUTH_TOKEN_TTL_SECONDS") {
        Ok(value) => parse_ttl(&value).context("Failed to parse AUTH_TOKEN_TTL_SECONDS")?,
        Err(_) => DEFAULT_TOKEN_TTL_SECONDS,
    };

    let token_leeway_seconds = match env::var("AUTH_TOKEN_LEEWAY_SECONDS") {
        Ok(value) => parse_leeway(&value).context("Failed to parse AUTH_TOKEN_LEEWAY_SECONDS")?,
        Err(_) => 0,
    };

    Ok(AuthConfig {
        jwt_secret,
        token_ttl_seconds,
        token_leeway_seconds,
    })
}

fn parse_ttl(value: &str) -> Result<i64> {
    let ttl: i64 = value
        .trim()
        .parse()
        .context("token TTL must be an integer number of seconds")?;
    if ttl <= 0 {
        bail!("token TTL must be positive, got {ttl}");
    }
    Ok(ttl)
}

fn parse_leeway(value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .context("leeway must be a non-negative number of seconds")
}
