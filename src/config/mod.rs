use crate::cli::Args;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

#[derive(Debug)]
pub enum ConfigError {
    InvalidApiUrl(String, url::ParseError),
    UnsupportedScheme(String),
    InvalidTokenStore(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidApiUrl(raw, e) => write!(f, "Invalid API URL '{}': {}", raw, e),
            ConfigError::UnsupportedScheme(raw) =>
                write!(f, "API URL '{}' must use http or https", raw),
            ConfigError::InvalidTokenStore(raw) =>
                write!(f, "Unsupported token store type: '{}'", raw),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidApiUrl(_, e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStoreType {
    File,
    Memory,
}

impl FromStr for TokenStoreType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(TokenStoreType::File),
            "memory" => Ok(TokenStoreType::Memory),
            _ => Err(ConfigError::InvalidTokenStore(s.to_string())),
        }
    }
}

impl fmt::Display for TokenStoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenStoreType::File => write!(f, "file"),
            TokenStoreType::Memory => write!(f, "memory"),
        }
    }
}

/// Validated client settings derived from the command line and environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub request_timeout: Duration,
    pub token_store: TokenStoreType,
    pub token_dir: PathBuf,
}

impl ClientConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let api_url = Url::parse(args.api_url.trim())
            .map_err(|e| ConfigError::InvalidApiUrl(args.api_url.clone(), e))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(args.api_url.clone()));
        }

        Ok(Self {
            api_url,
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            token_store: args.token_store.parse()?,
            token_dir: PathBuf::from(&args.token_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["support-chat"];
        argv.extend_from_slice(extra);
        argv.push("whoami");
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::from_args(&args(&["--api-url", "http://localhost:8000"])).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::from_args(&args(&["--api-url", "ftp://example.com"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(_)));
    }

    #[test]
    fn rejects_unknown_store() {
        let err = ClientConfig::from_args(
            &args(&["--api-url", "http://localhost:8000", "--token-store", "redis"])
        ).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTokenStore(_)));
    }

    #[test]
    fn store_type_is_case_insensitive() {
        assert_eq!("Memory".parse::<TokenStoreType>().unwrap(), TokenStoreType::Memory);
    }
}
