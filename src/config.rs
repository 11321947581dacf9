use crate::error::{E2eError, Result};
use crate::wait::{TimeoutBudget, DEFAULT_POLL_INTERVAL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";
pub const DEFAULT_STANDARD_USER: &str = "standard_user";
pub const DEFAULT_LOCKED_OUT_USER: &str = "locked_out_user";
pub const DEFAULT_PASSWORD: &str = "secret_sauce";

pub const ENV_BASE_URL: &str = "SAUCEDEMO_BASE_URL";
pub const ENV_STANDARD_USER: &str = "SAUCEDEMO_STANDARD_USER";
pub const ENV_LOCKED_OUT_USER: &str = "SAUCEDEMO_LOCKED_OUT_USER";
pub const ENV_PASSWORD: &str = "SAUCEDEMO_PASSWORD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Everything a scenario run needs besides the browser itself
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub standard: Credentials,
    pub locked_out: Credentials,
    pub default_timeout: TimeoutBudget,
    pub poll_interval: Duration,
    pub artifacts_dir: Option<PathBuf>,
}

impl Config {
    /// Defaults for everything except where the storefront lives
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            standard: Credentials::new(DEFAULT_STANDARD_USER, DEFAULT_PASSWORD),
            locked_out: Credentials::new(DEFAULT_LOCKED_OUT_USER, DEFAULT_PASSWORD),
            default_timeout: TimeoutBudget::DEFAULT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            artifacts_dir: None,
        }
    }

    /// Build from `SAUCEDEMO_*` environment variables, falling back to the
    /// public demo defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let password = get(ENV_PASSWORD, DEFAULT_PASSWORD);
        let config = Self {
            standard: Credentials::new(get(ENV_STANDARD_USER, DEFAULT_STANDARD_USER), password.clone()),
            locked_out: Credentials::new(get(ENV_LOCKED_OUT_USER, DEFAULT_LOCKED_OUT_USER), password),
            ..Self::new(parse_base_url(&get(ENV_BASE_URL, DEFAULT_BASE_URL))?)
        };

        if lookup(ENV_STANDARD_USER).is_none() && config.standard.password == DEFAULT_PASSWORD {
            info!("Using default storefront credentials; set {} and {} to override", ENV_STANDARD_USER, ENV_PASSWORD);
        }

        Ok(config)
    }
}

/// Parse a base URL, making sure relative joins stay under it
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(E2eError::config(format!("{} cannot be used as a base URL", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url.as_str(), "https://www.saucedemo.com/");
        assert_eq!(config.standard, Credentials::new("standard_user", "secret_sauce"));
        assert_eq!(config.locked_out, Credentials::new("locked_out_user", "secret_sauce"));
        assert_eq!(config.default_timeout, TimeoutBudget::DEFAULT);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BASE_URL, "http://localhost:3000/shop"),
            (ENV_STANDARD_USER, "problem_user"),
            (ENV_PASSWORD, "hunter2"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:3000/shop/");
        assert_eq!(config.standard, Credentials::new("problem_user", "hunter2"));
        assert_eq!(config.locked_out, Credentials::new("locked_out_user", "hunter2"));
    }

    #[test]
    fn test_empty_env_value_falls_back() {
        let config = Config::from_lookup(|k| (k == ENV_STANDARD_USER).then(String::new)).unwrap();
        assert_eq!(config.standard.username, "standard_user");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(parse_base_url("not a url"), Err(E2eError::Url(_))));
        assert!(matches!(parse_base_url("mailto:someone@example.com"), Err(E2eError::Config(_))));
    }
}
