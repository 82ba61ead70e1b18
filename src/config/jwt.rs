use anyhow::Result;
use std::env;

pub const MIN_SECRET_LEN: usize = 32;
/// Ten years.
pub const MAX_EXPIRY_SECS: u64 = 10 * 365 * 86_400;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_secs: u64, // 24 hours
}

impl JwtConfig {
    /// The signing secret has no fallback: startup fails without it.
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        let expiry_secs = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86_400);

        Self::new(secret, expiry_secs)
    }

    pub fn new(secret: impl Into<String>, expiry_secs: u64) -> Result<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {MIN_SECRET_LEN} characters"
            ));
        }
        if expiry_secs == 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRATION must be greater than zero"));
        }
        if expiry_secs > MAX_EXPIRY_SECS {
            return Err(anyhow::anyhow!(
                "JWT_EXPIRATION must be at most {MAX_EXPIRY_SECS} seconds"
            ));
        }

        Ok(Self {
            secret,
            expiry_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_rejected() {
        let err = JwtConfig::new("too-short", 60).unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn zero_expiry_rejected() {
        assert!(JwtConfig::new("x".repeat(32), 0).is_err());
    }

    #[test]
    fn oversized_expiry_rejected() {
        assert!(JwtConfig::new("x".repeat(32), MAX_EXPIRY_SECS + 1).is_err());
        assert!(JwtConfig::new("x".repeat(32), u64::MAX).is_err());
        assert!(JwtConfig::new("x".repeat(32), MAX_EXPIRY_SECS).is_ok());
    }

    #[test]
    fn valid_config() {
        let cfg = JwtConfig::new("x".repeat(40), 86_400).unwrap();
        assert_eq!(cfg.expiry_secs, 86_400);
    }
}
