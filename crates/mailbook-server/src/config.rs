use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("MAILBOOK_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("MAILBOOK_JWT_SECRET is unset or still a placeholder");
        }

        let db_path = lookup("MAILBOOK_DB_PATH").unwrap_or_else(|| "mailbook.db".into());
        let host = lookup("MAILBOOK_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("MAILBOOK_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("MAILBOOK_PORT must be a port number")?;

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            jwt_secret,
            db_path: db_path.into(),
            addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("MAILBOOK_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("mailbook.db"));
        assert_eq!(config.addr, "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn placeholder_secret_is_refused() {
        assert!(config(&[]).is_err());
        assert!(config(&[("MAILBOOK_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn bad_port_is_reported() {
        let err = config(&[("MAILBOOK_JWT_SECRET", "s3cret"), ("MAILBOOK_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("MAILBOOK_PORT"));
    }
}
