use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    error::AppError,
    model::ModelProvider,
    normalizer,
    prompt::build_prompt,
    types::{JobRiskAssessment, ReportProfile, Summary},
};

#[async_trait]
pub trait RiskAssessor: Send + Sync {
    async fn assess(&self, job_title: &str) -> Result<JobRiskAssessment, AppError>;
}

/// Fixed sample report, used when no model credential is configured.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderAssessor {
    profile: ReportProfile,
}

impl PlaceholderAssessor {
    pub fn new(profile: ReportProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl RiskAssessor for PlaceholderAssessor {
    async fn assess(&self, job_title: &str) -> Result<JobRiskAssessment, AppError> {
        let text = format!("AI could automate parts of the job '{job_title}'.");
        let summary = match self.profile {
            ReportProfile::Standard => Summary::Single { summary: text },
            ReportProfile::Regional => Summary::Regional {
                summary_global: text.clone(),
                summary_india: text,
            },
        };

        Ok(JobRiskAssessment {
            risk_score: 72,
            summary,
            factors: to_strings(&["Repetitive tasks", "Data-driven decision making"]),
            tools: to_strings(&["Python", "TensorFlow", "Cohere API"]),
            roadmap: to_strings(&["Learn Python", "Get AI fundamentals", "Practice with real data"]),
        })
    }
}

pub struct ModelAssessor {
    model: Arc<dyn ModelProvider>,
    profile: ReportProfile,
}

impl ModelAssessor {
    pub fn new(model: Arc<dyn ModelProvider>, profile: ReportProfile) -> Self {
        Self { model, profile }
    }
}

#[async_trait]
impl RiskAssessor for ModelAssessor {
    async fn assess(&self, job_title: &str) -> Result<JobRiskAssessment, AppError> {
        let request = build_prompt(job_title, self.profile);
        let raw = self
            .model
            .complete(request)
            .await
            .map_err(|error| AppError::ExternalCall(error.to_string()))?;
        debug!(reply_chars = raw.chars().count(), "normalizing model reply");

        normalizer::normalize(&raw, self.profile).map_err(|error| {
            warn!(error = %error, "model reply could not be normalized");
            AppError::MalformedModelOutput(error.to_string())
        })
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_owned()).collect()
}
