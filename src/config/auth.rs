use std::env;

pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Debug, Clone, Copy)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(|cost| cost.clamp(4, 31))
            .unwrap_or(DEFAULT_BCRYPT_COST);

        Self { bcrypt_cost }
    }
}
