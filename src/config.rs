use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use serde::Deserialize;

use crate::policy::{CorsOption, Policy};

fn default_port() -> u16 {
    3030
}

fn default_public() -> PathBuf {
    PathBuf::from("public")
}

#[derive(Debug, Default, Deserialize)]
pub struct CorsOptions {
    /// The allowed cross-origin domains
    pub origins: Option<Vec<String>>,
    /// The allowed request methods
    pub methods: Option<Vec<String>>,
    /// The allowed request headers
    pub headers: Option<Vec<String>>,
    /// How long (in seconds) a preflight result may be cached
    pub max_age: Option<u64>,
}

impl CorsOptions {
    /// The options that are set, in the order they are applied
    pub fn options(&self) -> Vec<CorsOption> {
        let mut options = Vec::with_capacity(4);
        if let Some(origins) = &self.origins {
            options.push(CorsOption::origins(origins.iter().cloned()));
        }
        if let Some(methods) = &self.methods {
            options.push(CorsOption::methods(methods.iter().cloned()));
        }
        if let Some(headers) = &self.headers {
            options.push(CorsOption::headers(headers.iter().cloned()));
        }
        if let Some(secs) = self.max_age {
            options.push(CorsOption::max_age(Duration::from_secs(secs)));
        }
        options
    }

    pub fn policy(&self) -> Policy {
        Policy::new(self.options())
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneralOptions {
    /// The port for the server
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind to `0.0.0.0` instead of `127.0.0.1`
    #[serde(default)]
    pub public: bool,
}

impl Default for GeneralOptions {
    fn default() -> Self {
        Self {
            port: default_port(),
            public: false,
        }
    }
}

impl GeneralOptions {
    pub fn ip(&self) -> [u8; 4] {
        match self.public {
            true => [0, 0, 0, 0],
            false => [127, 0, 0, 1],
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((self.ip(), self.port))
    }
}

#[derive(Debug, Deserialize)]
pub struct DataOptions {
    /// The directory served behind the CORS middleware
    #[serde(default = "default_public")]
    pub public: PathBuf,
}

impl Default for DataOptions {
    fn default() -> Self {
        Self {
            public: default_public(),
        }
    }
}

impl DataOptions {
    pub fn public(&self) -> &Path {
        &self.public
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralOptions,
    #[serde(default)]
    pub cors: CorsOptions,
    #[serde(default)]
    pub data: DataOptions,
}

#[derive(Parser)]
/// Serves a directory with CORS headers
pub struct Options {
    #[clap(long, default_value = "cors.toml")]
    pub cfg: PathBuf,
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, path::Path};

    use super::Config;

    #[test]
    fn test_full_config() {
        let cfg: Config = toml::from_str(
            r#"
            [general]
            port = 8080
            public = true

            [cors]
            origins = ["https://a.com", "https://b.com"]
            methods = ["GET", "POST"]
            headers = ["authorization"]
            max_age = 600

            [data]
            public = "static"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.general.addr(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(cfg.data.public(), Path::new("static"));

        let policy = cfg.cors.policy();
        assert_eq!(
            policy.allow_origin().unwrap(),
            "https://a.com, https://b.com"
        );
        assert_eq!(policy.allow_methods().unwrap(), "GET, POST");
        assert_eq!(policy.allow_headers().unwrap(), "authorization");
        assert_eq!(policy.max_age(), Some(600));
    }

    #[test]
    fn test_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.general.addr(), SocketAddr::from(([127, 0, 0, 1], 3030)));
        assert_eq!(cfg.data.public(), Path::new("public"));
        assert!(cfg.cors.options().is_empty());
        assert_eq!(cfg.cors.policy(), Default::default());
    }

    #[test]
    fn test_partial_cors() {
        let cfg: Config = toml::from_str(
            r#"
            [cors]
            max_age = 0
            methods = []
            "#,
        )
        .unwrap();
        let policy = cfg.cors.policy();
        assert_eq!(cfg.cors.options().len(), 2);
        assert!(policy.allow_origin().is_none());
        assert!(policy.allow_methods().is_none());
        assert_eq!(policy.max_age(), Some(0));
    }

    #[test]
    fn test_unknown_port_type() {
        let result = toml::from_str::<Config>("[general]\nport = \"http\"\n");
        assert!(result.is_err());
    }
}
