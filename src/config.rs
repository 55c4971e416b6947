use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::workflow::transition::ApprovalPolicy;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub approval_policy: ApprovalPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed("ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parsed("REFRESH_TOKEN_TTL", 604_800)?, // 7 days

            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", 60)?,
            rate_refresh_per_min: parsed("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            approval_policy: parsed("APPROVAL_POLICY", ApprovalPolicy::Strict)?,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://localhost/cuti_test".into(),
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            rate_login_per_min: 60,
            rate_refresh_per_min: 30,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            approval_policy: ApprovalPolicy::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keys are unique to each test so parallel tests don't race on the environment.
    #[test]
    fn parsed_falls_back_to_default() {
        assert_eq!(parsed::<u32>("CUTI_TEST_UNSET_KEY", 42).unwrap(), 42);
    }

    #[test]
    fn parsed_reads_and_rejects() {
        unsafe { env::set_var("CUTI_TEST_POLICY", "lenient") };
        assert_eq!(
            parsed("CUTI_TEST_POLICY", ApprovalPolicy::Strict).unwrap(),
            ApprovalPolicy::Lenient
        );

        unsafe { env::set_var("CUTI_TEST_TTL", "soon") };
        let err = parsed::<usize>("CUTI_TEST_TTL", 900).unwrap_err();
        assert!(err.to_string().contains("CUTI_TEST_TTL"));
    }

    #[test]
    fn required_names_the_missing_key() {
        let err = required("CUTI_TEST_MISSING_KEY").unwrap_err();
        assert!(err.to_string().contains("CUTI_TEST_MISSING_KEY must be set"));
    }
}
