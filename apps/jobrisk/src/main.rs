use std::sync::Arc;

use jobrisk_core::{
    analytics::AnalyticsLog,
    assessor::{ModelAssessor, PlaceholderAssessor, RiskAssessor},
    config::AppConfig,
    http::{self, AppState},
    model::{CohereTransport, FallbackChain},
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let assessor = build_assessor(&config)?;
    let analytics = AnalyticsLog::new(config.analytics_log.clone());
    match analytics.path() {
        Some(path) => info!(path = %path.display(), "appending analytics lines"),
        None => warn!("ANALYTICS_LOG is empty; analytics disabled"),
    }

    let app = http::router(AppState {
        assessor,
        analytics,
    });
    let listener = TcpListener::bind(config.http_bind).await?;
    info!(
        profile = config.report_profile.as_str(),
        "jobrisk HTTP API listening on {}", config.http_bind
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}

fn build_assessor(config: &AppConfig) -> anyhow::Result<Arc<dyn RiskAssessor>> {
    let placeholder = || -> Arc<dyn RiskAssessor> {
        Arc::new(PlaceholderAssessor::new(config.report_profile))
    };

    let provider = config.model_provider.to_lowercase();
    match provider.as_str() {
        "placeholder" => {
            warn!("MODEL_PROVIDER=placeholder; serving placeholder assessments");
            Ok(placeholder())
        }
        "cohere" | "auto" => match config.cohere_api_key.clone() {
            Some(api_key) => build_cohere_assessor(config, api_key),
            None => {
                warn!(
                    provider = %provider,
                    "COHERE_API_KEY is missing; serving placeholder assessments"
                );
                Ok(placeholder())
            }
        },
        other => {
            warn!(
                provider = %other,
                "unknown MODEL_PROVIDER value; valid values are auto|cohere|placeholder; falling back to auto"
            );
            match config.cohere_api_key.clone() {
                Some(api_key) => build_cohere_assessor(config, api_key),
                None => Ok(placeholder()),
            }
        }
    }
}

fn build_cohere_assessor(
    config: &AppConfig,
    api_key: String,
) -> anyhow::Result<Arc<dyn RiskAssessor>> {
    if config.cohere_models.is_empty() {
        warn!("COHERE_MODELS is empty; every check will fail");
    }
    let transport = CohereTransport::new(
        api_key,
        config.cohere_base_url.clone(),
        config.model_timeout,
    )?;
    let chain = FallbackChain::new(Arc::new(transport), config.cohere_models.clone());
    info!(models = ?chain.models(), "using Cohere model provider");

    Ok(Arc::new(ModelAssessor::new(
        Arc::new(chain),
        config.report_profile,
    )))
}
