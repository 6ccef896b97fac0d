use crate::models::PractitionerId;
use std::env;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PLAN91_PRACTITIONER_ID is not set")]
    MissingPractitioner,
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub practitioner_id: PractitionerId,
    pub session_cookie: Option<String>,
    pub login_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let practitioner_id = var("PLAN91_PRACTITIONER_ID")
            .map(|id| PractitionerId(id.trim().to_string()))
            .ok_or(ConfigError::MissingPractitioner)?;

        let port = match var("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_url: var("PLAN91_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            practitioner_id,
            session_cookie: var("PLAN91_SESSION_COOKIE"),
            login_url: var("PLAN91_LOGIN_URL").unwrap_or_else(|| "/login".to_string()),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn practitioner_is_required() {
        let err = Config::from_lookup(lookup(&[("PORT", "4000")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingPractitioner);
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("PLAN91_PRACTITIONER_ID", "p-1")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.login_url, "/login");
        assert!(config.session_cookie.is_none());
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("PLAN91_PRACTITIONER_ID", "p-1"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
