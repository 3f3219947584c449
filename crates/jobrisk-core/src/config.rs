use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use crate::types::ReportProfile;

const DEFAULT_COHERE_MODELS: &str = "command-r-plus,command-r,command";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: SocketAddr,
    pub model_provider: String,
    pub cohere_api_key: Option<String>,
    pub cohere_models: Vec<String>,
    pub cohere_base_url: String,
    pub model_timeout: Duration,
    pub report_profile: ReportProfile,
    pub analytics_log: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| "5000".to_owned());
        let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| format!("0.0.0.0:{port}"));
        let http_bind = http_bind.parse()?;

        let report_profile = match env::var("REPORT_PROFILE") {
            Ok(raw) => raw.parse()?,
            Err(_) => ReportProfile::default(),
        };

        Ok(Self {
            http_bind,
            model_provider: env::var("MODEL_PROVIDER").unwrap_or_else(|_| "auto".to_owned()),
            cohere_api_key: env::var("COHERE_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            cohere_models: parse_list(
                &env::var("COHERE_MODELS").unwrap_or_else(|_| DEFAULT_COHERE_MODELS.to_owned()),
            ),
            cohere_base_url: env::var("COHERE_BASE_URL")
                .unwrap_or_else(|_| "https://api.cohere.com".to_owned()),
            model_timeout: Duration::from_secs(env_u64("MODEL_TIMEOUT_SEC", 60)),
            report_profile,
            analytics_log: match env::var("ANALYTICS_LOG") {
                Ok(raw) if raw.trim().is_empty() => None,
                Ok(raw) => Some(PathBuf::from(raw.trim())),
                Err(_) => Some(PathBuf::from("analytics.jsonl")),
            },
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
