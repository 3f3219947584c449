use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRiskAssessment {
    pub risk_score: u8,
    #[serde(flatten)]
    pub summary: Summary,
    pub factors: Vec<String>,
    pub tools: Vec<String>,
    pub roadmap: Vec<String>,
}

/// Serialized flat into the parent record, so the wire shape carries either
/// `summary` or the `summary_global` / `summary_india` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Regional {
        summary_global: String,
        summary_india: String,
    },
    Single {
        summary: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportProfile {
    Standard,
    #[default]
    Regional,
}

impl ReportProfile {
    pub const MAX_FACTORS: usize = 8;
    pub const MAX_ROADMAP: usize = 12;

    pub fn as_str(self) -> &'static str {
        match self {
            ReportProfile::Standard => "standard",
            ReportProfile::Regional => "regional",
        }
    }

    pub fn max_tools(self) -> usize {
        match self {
            ReportProfile::Standard => 8,
            ReportProfile::Regional => 10,
        }
    }

    pub fn filters_tool_links(self) -> bool {
        matches!(self, ReportProfile::Regional)
    }
}

impl FromStr for ReportProfile {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ReportProfile::Standard),
            "regional" => Ok(ReportProfile::Regional),
            other => Err(anyhow::anyhow!(
                "unknown report profile: {other}; valid values are standard|regional"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub ts: DateTime<Utc>,
    pub job: String,
    pub risk: u8,
    pub factors_len: usize,
    pub tools_len: usize,
}

impl AnalyticsRecord {
    pub fn from_assessment(job: &str, assessment: &JobRiskAssessment) -> Self {
        Self {
            ts: Utc::now(),
            job: job.to_owned(),
            risk: assessment.risk_score,
            factors_len: assessment.factors.len(),
            tools_len: assessment.tools.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{JobRiskAssessment, ReportProfile, Summary};

    #[test]
    fn single_summary_serializes_flat() {
        let assessment = JobRiskAssessment {
            risk_score: 40,
            summary: Summary::Single {
                summary: "moderate".to_owned(),
            },
            factors: vec!["a".to_owned()],
            tools: Vec::new(),
            roadmap: Vec::new(),
        };

        let value = serde_json::to_value(&assessment).expect("assessment should serialize");
        assert_eq!(value["summary"], "moderate");
        assert!(value.get("summary_global").is_none());
        assert_eq!(value["risk_score"], 40);
    }

    #[test]
    fn regional_summary_serializes_both_fields() {
        let assessment = JobRiskAssessment {
            risk_score: 5,
            summary: Summary::Regional {
                summary_global: "global".to_owned(),
                summary_india: "india".to_owned(),
            },
            factors: Vec::new(),
            tools: Vec::new(),
            roadmap: Vec::new(),
        };

        let value = serde_json::to_value(&assessment).expect("assessment should serialize");
        assert_eq!(
            value,
            json!({
                "risk_score": 5,
                "summary_global": "global",
                "summary_india": "india",
                "factors": [],
                "tools": [],
                "roadmap": []
            })
        );
    }

    #[test]
    fn profile_parses_case_insensitively() {
        assert_eq!(
            " Standard ".parse::<ReportProfile>().expect("profile should parse"),
            ReportProfile::Standard
        );
        assert!("weekly".parse::<ReportProfile>().is_err());
        assert_eq!(ReportProfile::Regional.max_tools(), 10);
        assert!(!ReportProfile::Standard.filters_tool_links());
    }
}
