use std::{collections::HashMap, fs};

use anyhow::{bail, Context};
use client_core::risk::DEFAULT_GENERATIVE_MODEL;

#[derive(Debug)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".into(),
            request_timeout_secs: 10,
            gemini_api_key: None,
            gemini_model: DEFAULT_GENERATIVE_MODEL.into(),
        }
    }
}

/// Defaults, then `safeor.toml`, then environment. A missing AI credential
/// is a recognized state, not an error; the risk gateway degrades on it.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("safeor.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("gemini_model") {
                settings.gemini_model = v.clone();
            }
            if let Some(v) = file_cfg.get("request_timeout_secs") {
                if let Ok(parsed) = v.parse::<u64>() {
                    settings.request_timeout_secs = parsed;
                }
            }
        }
    }

    if let Ok(v) = std::env::var("SAFEOR_API_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("APP__API_URL") {
        settings.api_base_url = v;
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Ok(v) = std::env::var("GEMINI_API_KEY") {
        settings.gemini_api_key = Some(v);
    }
    if let Ok(v) = std::env::var("APP__GEMINI_API_KEY") {
        settings.gemini_api_key = Some(v);
    }

    if let Ok(v) = std::env::var("APP__GEMINI_MODEL") {
        settings.gemini_model = v;
    }

    settings
}

pub fn validate_base_url(raw: &str) -> anyhow::Result<String> {
    let parsed = url::Url::parse(raw).with_context(|| format!("invalid api base url '{raw}'"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        bail!("api base url '{raw}' must use http or https");
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_point_at_local_backend() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "http://127.0.0.1:8000/api");
        assert_eq!(settings.request_timeout_secs, 10);
        assert!(settings.gemini_api_key.is_none());
    }

    #[test]
    fn validate_base_url_trims_trailing_slash() {
        assert_eq!(
            validate_base_url("http://qms.local/api/").expect("valid"),
            "http://qms.local/api"
        );
    }

    #[test]
    fn validate_base_url_rejects_non_http_schemes() {
        assert!(validate_base_url("ftp://qms.local/api").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn env_overrides_beat_defaults() {
        std::env::set_var("APP__API_URL", "http://staging.qms.local/api");
        std::env::set_var("APP__REQUEST_TIMEOUT_SECS", "3");

        let settings = load_settings();
        assert_eq!(settings.api_base_url, "http://staging.qms.local/api");
        assert_eq!(settings.request_timeout_secs, 3);

        std::env::remove_var("APP__API_URL");
        std::env::remove_var("APP__REQUEST_TIMEOUT_SECS");
    }
}
