use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub clock_interval_ms: u64,
    pub highlight_ttl_ms: u64,
    pub request_timeout_ms: u64,
    pub fast_forward_steps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            poll_interval_ms: 2000,
            clock_interval_ms: 1000,
            highlight_ttl_ms: 3000,
            request_timeout_ms: 5000,
            fast_forward_steps: 5,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    clock_interval_ms: Option<u64>,
    highlight_ttl_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    fast_forward_steps: Option<u32>,
}

/// Everything the poller and the HTTP client need, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Backend root without a trailing slash.
    pub base_url: String,
    pub poll_interval: Duration,
    pub clock_interval: Duration,
    pub highlight_ttl: Duration,
    pub request_timeout: Duration,
    pub fast_forward_steps: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            base_url: settings.base_url,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            clock_interval: Duration::from_millis(settings.clock_interval_ms),
            highlight_ttl: Duration::from_millis(settings.highlight_ttl_ms),
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
            fast_forward_steps: settings.fast_forward_steps,
        }
    }
}

impl PollerConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

/// Defaults, then the TOML file, then environment overrides.
///
/// A missing file is fine when falling back to [`DEFAULT_CONFIG_PATH`]; an
/// explicitly requested file must exist.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    if required || path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let file_cfg = parse_file_settings(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
        apply_file_settings(&mut settings, file_cfg);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn parse_file_settings(raw: &str) -> anyhow::Result<FileSettings> {
    Ok(toml::from_str(raw)?)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file_cfg.poll_interval_ms {
        settings.poll_interval_ms = v;
    }
    if let Some(v) = file_cfg.clock_interval_ms {
        settings.clock_interval_ms = v;
    }
    if let Some(v) = file_cfg.highlight_ttl_ms {
        settings.highlight_ttl_ms = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = file_cfg.fast_forward_steps {
        settings.fast_forward_steps = v;
    }
}

fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("SIM_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    let millis = [
        ("APP__POLL_INTERVAL_MS", &mut settings.poll_interval_ms),
        ("APP__CLOCK_INTERVAL_MS", &mut settings.clock_interval_ms),
        ("APP__HIGHLIGHT_TTL_MS", &mut settings.highlight_ttl_ms),
        ("APP__REQUEST_TIMEOUT_MS", &mut settings.request_timeout_ms),
    ];
    for (key, slot) in millis {
        if let Some(v) = lookup(key) {
            *slot = v
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a whole number of milliseconds"))?;
        }
    }

    if let Some(v) = lookup("APP__FAST_FORWARD_STEPS") {
        settings.fast_forward_steps = v
            .trim()
            .parse()
            .context("APP__FAST_FORWARD_STEPS must be a positive integer")?;
    }

    Ok(())
}

impl Settings {
    pub fn poller_config(&self) -> anyhow::Result<PollerConfig> {
        let base_url = normalize_base_url(&self.base_url)?;

        for (name, value) in [
            ("poll_interval_ms", self.poll_interval_ms),
            ("clock_interval_ms", self.clock_interval_ms),
            ("highlight_ttl_ms", self.highlight_ttl_ms),
            ("request_timeout_ms", self.request_timeout_ms),
        ] {
            if value == 0 {
                bail!("{name} must be greater than zero");
            }
        }
        if self.fast_forward_steps == 0 {
            bail!("fast_forward_steps must be greater than zero");
        }

        Ok(PollerConfig {
            base_url,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            clock_interval: Duration::from_millis(self.clock_interval_ms),
            highlight_ttl: Duration::from_millis(self.highlight_ttl_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            fast_forward_steps: self.fast_forward_steps,
        })
    }
}

fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Settings::default().base_url);
    }

    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid backend base url '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "backend base url '{trimmed}' must use http or https, not '{}'",
            parsed.scheme()
        );
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        bail!("backend base url '{trimmed}' must not carry a query or fragment");
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
