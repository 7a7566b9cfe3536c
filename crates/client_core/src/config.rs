use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "predictor.toml";
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base address of the prediction service, without a trailing slash.
    pub api_url: String,
    /// Build version of this front end, shown next to the model version.
    pub app_version: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            app_version: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientSettings {
    pub fn with_api_url(mut self, api_url: &str) -> anyhow::Result<Self> {
        self.api_url = normalize_api_url(api_url)?;
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    app_version: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Loads settings from `predictor.toml` (or `config_path`) and the process environment.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    load_settings_with(config_path, |name| {
        std::env::var(name).ok().filter(|value| !value.trim().is_empty())
    })
}

pub fn load_settings_with(
    config_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid settings file '{}'", path.display()))?;
            if let Some(v) = file_cfg.api_url {
                settings.api_url = v;
            }
            if let Some(v) = file_cfg.app_version {
                settings.app_version = Some(v);
            }
            if let Some(secs) = file_cfg.request_timeout_secs {
                apply_timeout_secs(&mut settings, secs);
            }
        }
        // Only an explicitly requested file has to exist.
        Err(err) if config_path.is_none() && err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()));
        }
    }

    if let Some(v) = env("API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("APP_VERSION") {
        settings.app_version = Some(v);
    }
    if let Some(v) = env("APP__APP_VERSION") {
        settings.app_version = Some(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(secs) => apply_timeout_secs(&mut settings, secs),
            Err(err) => warn!("ignoring APP__REQUEST_TIMEOUT_SECS={v:?}: {err}"),
        }
    }

    settings.api_url = normalize_api_url(&settings.api_url)?;
    Ok(settings)
}

fn apply_timeout_secs(settings: &mut ClientSettings, secs: u64) {
    if secs == 0 {
        warn!("ignoring zero request timeout; keeping {:?}", settings.request_timeout);
        return;
    }
    settings.request_timeout = Duration::from_secs(secs);
}

pub fn normalize_api_url(raw_api_url: &str) -> anyhow::Result<String> {
    let trimmed = raw_api_url.trim().trim_end_matches('/');

    if trimmed.is_empty() {
        return Ok(ClientSettings::default().api_url);
    }

    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid api url '{raw_api_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "unsupported scheme '{}' in api url '{raw_api_url}'",
            parsed.scheme()
        );
    }

    Ok(trimmed.to_string())
}
