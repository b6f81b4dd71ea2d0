use std::{fs, path::Path};

use anyhow::Context;
use client_core::{EndpointError, ServiceEndpoints};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "blog.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub user_service_url: String,
    pub post_service_url: String,
    pub comment_service_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_service_url: "http://localhost:8001".into(),
            post_service_url: "http://localhost:8002".into(),
            comment_service_url: "http://localhost:8003".into(),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn endpoints(&self) -> Result<ServiceEndpoints, EndpointError> {
        ServiceEndpoints::new(
            &self.user_service_url,
            &self.post_service_url,
            &self.comment_service_url,
        )
    }
}

/// Defaults, then the TOML file, then environment variables.
///
/// An explicit `path` must exist; the default `blog.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            parse_settings(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?
        }
        None => match fs::read_to_string(DEFAULT_CONFIG_FILE) {
            Ok(raw) => parse_settings(&raw)
                .with_context(|| format!("failed to parse config file '{DEFAULT_CONFIG_FILE}'"))?,
            Err(_) => Settings::default(),
        },
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn parse_settings(raw: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(raw)
}

// The APP__ form wins when both are set.
fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let fields: [(&str, &str, &mut String); 4] = [
        (
            "BLOG_USER_SERVICE_URL",
            "APP__USER_SERVICE_URL",
            &mut settings.user_service_url,
        ),
        (
            "BLOG_POST_SERVICE_URL",
            "APP__POST_SERVICE_URL",
            &mut settings.post_service_url,
        ),
        (
            "BLOG_COMMENT_SERVICE_URL",
            "APP__COMMENT_SERVICE_URL",
            &mut settings.comment_service_url,
        ),
        ("BLOG_LOG", "APP__LOG_FILTER", &mut settings.log_filter),
    ];

    for (plain, prefixed, slot) in fields {
        if let Some(value) = lookup(plain) {
            *slot = value;
        }
        if let Some(value) = lookup(prefixed) {
            *slot = value;
        }
    }
}
