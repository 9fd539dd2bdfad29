use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::types::AveragingPolicy;

pub const API_URL_ENV: &str = "STRIKEMETRIC_API_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    PunchAnalysis,
    PunchAnalysisBatch,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::PunchAnalysis => "/punch-analysis",
            Endpoint::PunchAnalysisBatch => "/punch-analysis/batch",
        }
    }
}

/// Valgfri konfig-fil (JSON). Alle felt kan mangle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cfg {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub averaging: Option<AveragingPolicy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Ingen timeout med mindre konfig-filen setter `request_timeout_secs`.
    pub timeout: Option<Duration>,
    pub averaging: AveragingPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: None,
            averaging: AveragingPolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Rekkefølge: env-variabel > konfig-fil > standard.
    pub fn resolve(env_url: Option<String>, cfg: Option<&Cfg>) -> Self {
        let mut out = Self::default();
        if let Some(cfg) = cfg {
            if let Some(url) = non_blank(cfg.api_base_url.as_deref()) {
                out.base_url = url;
            }
            if let Some(secs) = cfg.request_timeout_secs.filter(|s| *s > 0) {
                out.timeout = Some(Duration::from_secs(secs));
            }
            if let Some(policy) = cfg.averaging {
                out.averaging = policy;
            }
        }
        if let Some(url) = non_blank(env_url.as_deref()) {
            out.base_url = url;
        }
        out.base_url = out.base_url.trim_end_matches('/').to_string();
        out
    }

    pub fn from_env() -> Self {
        Self::resolve(std::env::var(API_URL_ENV).ok(), None)
    }

    pub fn from_env_and_file(path: &Path) -> anyhow::Result<Self> {
        let cfg = load_cfg(path)?;
        Ok(Self::resolve(std::env::var(API_URL_ENV).ok(), Some(&cfg)))
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

pub fn load_cfg(path: &Path) -> anyhow::Result<Cfg> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("kunne ikke lese konfig {}", path.display()))?;
    let cfg: Cfg = serde_json::from_str(&contents)
        .with_context(|| format!("ugyldig konfig {}", path.display()))?;
    log::info!("konfig lastet fra {}", path.display());
    Ok(cfg)
}
