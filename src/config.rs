//! Environment-driven gateway configuration
//!
//! Every backend location is read from `{PREFIX}_URL`, `{PREFIX}_PORT` and
//! `{PREFIX}_ENTRY`, each falling back to its own default. Empty variables
//! count as unset.

use std::time::Duration;

use crate::{GatewayError, Result};

const DEFAULT_PORT: u16 = 4500;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOKEN_SERVICE_URL: &str = "http://35.193.172.140:3005";

/// Location of one backend service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: String,
    pub entry: String,
}

impl ServiceEndpoint {
    fn from_lookup<F>(lookup: &F, prefix: &str, host: &str, port: &str, entry: &str) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str, default: &str| {
            lookup(&format!("{}_{}", prefix, suffix)).unwrap_or_else(|| default.to_string())
        };

        Self {
            host: var("URL", host),
            port: var("PORT", port),
            entry: var("ENTRY", entry),
        }
    }

    /// `http://{host}:{port}/{entry}`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/{}", self.host, self.port, self.entry)
    }
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listening port of the gateway itself
    pub port: u16,
    /// Log every upstream URL at `info`
    pub show_urls: bool,
    pub upstream_timeout: Duration,
    /// Identity service used for token verification and issuance
    pub token_service_url: String,
    pub users: ServiceEndpoint,
    pub prestamos: ServiceEndpoint,
    pub profile_pictures: ServiceEndpoint,
    pub bicicletas: ServiceEndpoint,
    /// Credential check (LDAP) behind the `auth` mutation
    pub auth: ServiceEndpoint,
}

impl GatewayConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                GatewayError::Config(format!("PORT must be a port number, got `{}`", raw))
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| {
                GatewayError::Config(format!(
                    "UPSTREAM_TIMEOUT_SECS must be a number of seconds, got `{}`",
                    raw
                ))
            })?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        Ok(Self {
            port,
            show_urls: lookup("SHOW_URLS").is_some(),
            upstream_timeout: Duration::from_secs(timeout_secs),
            token_service_url: lookup("TOKEN_SERVICE_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_SERVICE_URL.to_string()),
            users: ServiceEndpoint::from_lookup(&lookup, "USERS", "users-ms", "3001", "users"),
            prestamos: ServiceEndpoint::from_lookup(
                &lookup,
                "PRESTAMOS",
                "localhost",
                "3002",
                "prestamos",
            ),
            profile_pictures: ServiceEndpoint::from_lookup(
                &lookup,
                "PROFILES_PHOTOS",
                "192.168.99.101",
                "3003",
                "profilepictures",
            ),
            bicicletas: ServiceEndpoint::from_lookup(
                &lookup,
                "BICICLETAS",
                "192.168.99.102",
                "3004",
                "bicicletas",
            ),
            auth: ServiceEndpoint::from_lookup(&lookup, "AUTH", "users-ms", "3001", "ldap"),
        })
    }
}
