//! Configuration loader and validator for the portfolio server.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

const FALLBACK_TITLE: &str = "Portfolio";
const FALLBACK_DOMAIN: &str = "example.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("Missing configuration: {0}")]
    Missing(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
///
/// Every section is optional in the file; required values are enforced when
/// first used, via the accessors below, so the server can boot and serve its
/// static surface without credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub arena: Arena,
    #[serde(default)]
    pub site: Site,
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream content platform settings: API token and the channel slugs the
/// site is built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Arena {
    pub token: Option<String>,
    pub bio_channel: Option<String>,
    pub work_channel: Option<String>,
    pub blog_channel: Option<String>,
}

/// Site identity used for titles and absolute URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Site {
    pub title: Option<String>,
    pub domain: Option<String>,
    pub blog_subdomain: Option<String>,
}

/// Cache invalidation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheSettings {
    pub revalidate_secret: Option<String>,
}

fn filled(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Bearer token for the upstream API. Required for any channel fetch.
    pub fn arena_token(&self) -> Result<&str, ConfigError> {
        filled(self.arena.token.as_ref())
            .ok_or(ConfigError::Missing("arena.token (or ARENA_TOKEN)"))
    }

    /// Slug of the channel holding the bio sections.
    pub fn bio_channel(&self) -> Result<&str, ConfigError> {
        filled(self.arena.bio_channel.as_ref()).ok_or(ConfigError::Missing("arena.bio_channel"))
    }

    /// Slug of the channel holding the portfolio slides.
    pub fn work_channel(&self) -> Result<&str, ConfigError> {
        filled(self.arena.work_channel.as_ref()).ok_or(ConfigError::Missing("arena.work_channel"))
    }

    /// Slug of the channel holding the blog entries.
    pub fn blog_channel(&self) -> Result<&str, ConfigError> {
        filled(self.arena.blog_channel.as_ref()).ok_or(ConfigError::Missing("arena.blog_channel"))
    }

    /// Shared secret for the invalidation endpoint, if one is configured.
    pub fn revalidate_secret(&self) -> Option<&str> {
        filled(self.cache.revalidate_secret.as_ref())
    }

    pub fn site_title(&self) -> &str {
        filled(self.site.title.as_ref()).unwrap_or(FALLBACK_TITLE)
    }

    pub fn site_domain(&self) -> &str {
        filled(self.site.domain.as_ref()).unwrap_or(FALLBACK_DOMAIN)
    }

    /// Absolute base URL for the site. A domain already carrying a scheme is
    /// kept as-is, otherwise https is assumed.
    pub fn base_url(&self) -> String {
        let domain = self.site_domain();
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    /// Absolute URL of the blog host, when a subdomain is configured.
    pub fn blog_url(&self) -> Option<String> {
        let sub = filled(self.site.blog_subdomain.as_ref())?;
        let domain = self
            .site_domain()
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        Some(format!("https://{sub}.{domain}"))
    }
}

/// Load configuration from a YAML file, apply environment overrides, and
/// validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
/// - A missing default file yields the built-in defaults; env vars can still
///   provide the credentials.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut cfg = match path {
        Some(p) => serde_yaml::from_str(&fs::read_to_string(p)?)?,
        None => match fs::read_to_string("config.yaml") {
            Ok(content) => serde_yaml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(e.into()),
        },
    };
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}

/// `ARENA_TOKEN` and `REVALIDATE_SECRET` take precedence over the file so
/// deployments can keep secrets out of it.
fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(token) = std::env::var("ARENA_TOKEN") {
        if !token.trim().is_empty() {
            cfg.arena.token = Some(token);
        }
    }
    if let Ok(secret) = std::env::var("REVALIDATE_SECRET") {
        if !secret.trim().is_empty() {
            cfg.cache.revalidate_secret = Some(secret);
        }
    }
}

/// Validate a configuration instance. Only structural problems are fatal
/// here; missing credentials surface when first used.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.host.trim().is_empty() {
        return Err(ConfigError::Invalid("server.host must be non-empty"));
    }
    if cfg.server.port == 0 {
        return Err(ConfigError::Invalid("server.port must be > 0"));
    }
    Ok(())
}

/// Example YAML configuration.
pub fn example() -> &'static str {
    r#"server:
  host: "127.0.0.1"
  port: 8080

arena:
  token: "YOUR_ARENA_ACCESS_TOKEN"
  bio_channel: "my-bio-channel"
  work_channel: "my-work-channel"
  blog_channel: "my-blog-channel"

site:
  title: "My Portfolio"
  domain: "example.com"
  blog_subdomain: "blog"

cache:
  revalidate_secret: "CHANGE_ME"
"#
}
