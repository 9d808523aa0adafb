//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`APP_API__BASE_URL` sets `api.base_url`). Provides helpers to expand `~`
//! and `${VAR}` and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Merge `config.toml`, the `config.<env>.toml` overlay, then `APP_*` variables.
    pub fn load_from(dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed settings with defaults for every missing key.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        match env {
            "prod" | "production" => {
                let base_url: String = self.get("api.base_url").unwrap_or_default();
                if !base_url.starts_with("https://") {
                    return Err(Error::InvalidConfig(format!(
                        "production api.base_url must use https, got '{base_url}'"
                    ))
                    .into());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub views: BTreeMap<String, ViewSettings>,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self { base_url: "http://127.0.0.1:8000/api".to_string(), timeout_secs: 15, max_pages: 20 }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!("api.base_url must be an http(s) URL, got '{url}'")));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::InvalidConfig("api.timeout_secs must be positive".to_string()));
        }
        if self.api.max_pages == 0 {
            return Err(Error::InvalidConfig("api.max_pages must be positive".to_string()));
        }
        for (name, view) in &self.views {
            if view.page_size == 0 {
                return Err(Error::InvalidConfig(format!("views.{name}.page_size must be positive")));
            }
        }
        Ok(())
    }

    /// Configured page size for a profile, if any.
    #[must_use]
    pub fn page_size_for(&self, profile: &str) -> Option<NonZeroUsize> {
        self.views.get(profile).and_then(|v| NonZeroUsize::new(v.page_size))
    }
}

/// Expand `~` and `$VAR` / `${VAR}` in a user-supplied path such as a
/// `--file` fixture. Unset variables are left as written.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let raw = input.as_ref();
    let with_vars = shellexpand::env(raw).unwrap_or(std::borrow::Cow::Borrowed(raw));
    PathBuf::from(shellexpand::tilde(&with_vars).as_ref())
}

/// Expanded path, joined onto `base` unless already absolute.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, input: S) -> PathBuf {
    let path = expand_path(input);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
