//! Turns free-form model replies into a bounded [`JobRiskAssessment`].
//!
//! Extraction is the only fallible step. Once a JSON object has been found,
//! every field is coerced independently and falls back to an empty default.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{JobRiskAssessment, ReportProfile, Summary};

const MAX_RISK_SCORE: i64 = 100;

static JSON_OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("object span pattern is valid"));

static LINKED_TOOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.+\s\(https?://[^\s()]+\)$").expect("linked tool pattern is valid")
});

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("embedded JSON object is invalid: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result of the link filter on the tools list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolFilterOutcome {
    Filtered(Vec<String>),
    /// Nothing matched `Name (https://url)`, so the unfiltered list is kept
    /// rather than returning no tools at all.
    Degraded(Vec<String>),
}

pub fn normalize(
    raw: &str,
    profile: ReportProfile,
) -> Result<JobRiskAssessment, NormalizeError> {
    let object = extract_json_object(raw)?;

    let summary = match profile {
        ReportProfile::Standard => Summary::Single {
            summary: coerce_text(object.get("summary")),
        },
        ReportProfile::Regional => Summary::Regional {
            summary_global: coerce_text(object.get("summary_global")),
            summary_india: coerce_text(object.get("summary_india")),
        },
    };

    let mut tools = coerce_list(object.get("tools"), profile.max_tools());
    if profile.filters_tool_links() {
        tools = match filter_linked_tools(tools) {
            ToolFilterOutcome::Filtered(kept) => kept,
            ToolFilterOutcome::Degraded(unfiltered) => {
                warn!(
                    tools = unfiltered.len(),
                    "no tool entry carries a link; returning tools unfiltered"
                );
                unfiltered
            }
        };
    }

    Ok(JobRiskAssessment {
        risk_score: coerce_risk_score(object.get("risk_score")),
        summary,
        factors: coerce_list(object.get("factors"), ReportProfile::MAX_FACTORS),
        tools,
        roadmap: coerce_list(object.get("roadmap"), ReportProfile::MAX_ROADMAP),
    })
}

/// Parses the whole reply as a JSON object, or failing that the greedy span
/// from the first `{` to the last `}`.
pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>, NormalizeError> {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(raw.trim()) {
        return Ok(object);
    }

    let span = JSON_OBJECT_SPAN
        .find(raw)
        .ok_or(NormalizeError::NoJsonObject)?;
    debug!(
        start = span.start(),
        end = span.end(),
        "recovering JSON object from surrounding text"
    );

    match serde_json::from_str::<Value>(span.as_str())? {
        Value::Object(object) => Ok(object),
        _ => Err(NormalizeError::NoJsonObject),
    }
}

pub fn coerce_risk_score(value: Option<&Value>) -> u8 {
    let score = match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Some(Value::Bool(flag)) => Some(i64::from(*flag)),
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    score
        .map(|score| score.clamp(0, MAX_RISK_SCORE) as u8)
        .unwrap_or(0)
}

pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn coerce_list(value: Option<&Value>, max_len: usize) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .take(max_len)
            .map(|item| coerce_text(Some(item)))
            .collect(),
        Some(scalar) if is_truthy(scalar) && max_len > 0 => vec![coerce_text(Some(scalar))],
        _ => Vec::new(),
    }
}

pub fn filter_linked_tools(tools: Vec<String>) -> ToolFilterOutcome {
    if tools.is_empty() {
        return ToolFilterOutcome::Filtered(tools);
    }

    let linked = tools
        .iter()
        .map(|tool| tool.trim())
        .filter(|tool| LINKED_TOOL.is_match(tool))
        .map(str::to_owned)
        .collect::<Vec<_>>();

    if linked.is_empty() {
        ToolFilterOutcome::Degraded(tools)
    } else {
        ToolFilterOutcome::Filtered(linked)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|float| float != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::types::{ReportProfile, Summary};

    use super::{
        NormalizeError, ToolFilterOutcome, coerce_list, coerce_risk_score, coerce_text,
        extract_json_object, filter_linked_tools, normalize,
    };

    #[test]
    fn extracts_pure_json() {
        let object = extract_json_object(r#"{"risk_score": 10}"#).expect("pure JSON should parse");
        assert_eq!(object["risk_score"], 10);
    }

    #[test]
    fn extracts_json_wrapped_in_prose() {
        let raw = "Sure! Here is the result: {\"risk_score\": 10, \"summary\": \"ok\"} Hope this helps!";
        let object = extract_json_object(raw).expect("wrapped JSON should parse");
        assert_eq!(object["risk_score"], 10);
        assert_eq!(object["summary"], "ok");
    }

    #[test]
    fn extracts_json_from_code_fence() {
        let raw = "```json\n{\n  \"risk_score\": 33,\n  \"tools\": []\n}\n```";
        let object = extract_json_object(raw).expect("fenced JSON should parse");
        assert_eq!(object["risk_score"], 33);
    }

    #[test]
    fn text_without_braces_is_malformed() {
        let error = extract_json_object("I cannot help with that.")
            .expect_err("text without an object should fail");
        assert!(matches!(error, NormalizeError::NoJsonObject));
    }

    #[test]
    fn broken_object_is_malformed() {
        let error = extract_json_object("here: {\"risk_score\": } done")
            .expect_err("broken object should fail");
        assert!(matches!(error, NormalizeError::InvalidJson(_)));
    }

    #[test]
    fn top_level_array_is_not_an_object() {
        let error = extract_json_object("[1, 2, 3]").expect_err("array is not an object");
        assert!(matches!(error, NormalizeError::NoJsonObject));
    }

    #[test]
    fn risk_score_is_clamped_and_defaulted() {
        assert_eq!(coerce_risk_score(Some(&json!(-50))), 0);
        assert_eq!(coerce_risk_score(Some(&json!(500))), 100);
        assert_eq!(coerce_risk_score(Some(&json!("abc"))), 0);
        assert_eq!(coerce_risk_score(Some(&json!(" 64 "))), 64);
        assert_eq!(coerce_risk_score(Some(&json!(72.9))), 72);
        assert_eq!(coerce_risk_score(Some(&json!(true))), 1);
        assert_eq!(coerce_risk_score(Some(&Value::Null)), 0);
        assert_eq!(coerce_risk_score(None), 0);
    }

    #[test]
    fn text_fields_stringify_non_strings() {
        assert_eq!(coerce_text(Some(&json!("plain"))), "plain");
        assert_eq!(coerce_text(Some(&json!(42))), "42");
        assert_eq!(coerce_text(Some(&json!(["a"]))), "[\"a\"]");
        assert_eq!(coerce_text(Some(&Value::Null)), "");
        assert_eq!(coerce_text(None), "");
    }

    #[test]
    fn list_fields_wrap_scalars_and_truncate() {
        let many = (0..20).map(|index| format!("factor {index}")).collect::<Vec<_>>();
        let factors = coerce_list(Some(&json!(many)), 8);
        assert_eq!(factors.len(), 8);
        assert_eq!(factors[0], "factor 0");
        assert_eq!(factors[7], "factor 7");

        assert_eq!(coerce_list(Some(&json!("single")), 8), vec!["single"]);
        assert_eq!(coerce_list(Some(&json!([1, "two"])), 8), vec!["1", "two"]);
        assert!(coerce_list(Some(&json!("")), 8).is_empty());
        assert!(coerce_list(Some(&json!(0)), 8).is_empty());
        assert!(coerce_list(None, 8).is_empty());
    }

    #[test]
    fn tool_filter_keeps_linked_entries() {
        let outcome = filter_linked_tools(vec![
            "Coursera (https://coursera.org)".to_owned(),
            "BadEntry".to_owned(),
        ]);
        assert_eq!(
            outcome,
            ToolFilterOutcome::Filtered(vec!["Coursera (https://coursera.org)".to_owned()])
        );
    }

    #[test]
    fn tool_filter_degrades_to_unfiltered_list() {
        let tools = vec!["Python".to_owned(), "Excel (ftp://x.org)".to_owned()];
        let outcome = filter_linked_tools(tools.clone());
        assert_eq!(outcome, ToolFilterOutcome::Degraded(tools));
    }

    #[test]
    fn tool_filter_requires_trailing_link() {
        let outcome = filter_linked_tools(vec![
            "(https://bare.org)".to_owned(),
            "Notion (https://notion.so) extra".to_owned(),
            "Figma (http://figma.com)".to_owned(),
        ]);
        assert_eq!(
            outcome,
            ToolFilterOutcome::Filtered(vec!["Figma (http://figma.com)".to_owned()])
        );
    }

    #[test]
    fn tool_filter_returns_linked_entries_trimmed() {
        let outcome = filter_linked_tools(vec![
            "  Kaggle (https://kaggle.com)\n".to_owned(),
            "Spreadsheets".to_owned(),
        ]);
        assert_eq!(
            outcome,
            ToolFilterOutcome::Filtered(vec!["Kaggle (https://kaggle.com)".to_owned()])
        );
    }

    #[test]
    fn normalizes_regional_reply() {
        let roadmap = (1..=15)
            .map(|week| format!("Week {week}: study"))
            .collect::<Vec<_>>();
        let raw = json!({
            "risk_score": "85",
            "summary_global": "High exposure.",
            "summary_india": "Lower in tier-2 cities.",
            "factors": ["Routine work"],
            "tools": [
                "Coursera (https://coursera.org)",
                "BadEntry",
                "Kaggle (https://kaggle.com)"
            ],
            "roadmap": roadmap
        })
        .to_string();

        let assessment = normalize(&raw, ReportProfile::Regional).expect("reply should normalize");
        assert_eq!(assessment.risk_score, 85);
        assert_eq!(
            assessment.summary,
            Summary::Regional {
                summary_global: "High exposure.".to_owned(),
                summary_india: "Lower in tier-2 cities.".to_owned(),
            }
        );
        assert_eq!(
            assessment.tools,
            vec!["Coursera (https://coursera.org)", "Kaggle (https://kaggle.com)"]
        );
        assert_eq!(assessment.roadmap.len(), 12);
        assert_eq!(assessment.roadmap[11], "Week 12: study");
    }

    #[test]
    fn standard_profile_keeps_unlinked_tools() {
        let raw = r#"Result: {"risk_score": 500, "summary": "x", "tools": ["Python", "SQL"], "factors": "Repetition"}"#;
        let assessment = normalize(raw, ReportProfile::Standard).expect("reply should normalize");
        assert_eq!(assessment.risk_score, 100);
        assert_eq!(
            assessment.summary,
            Summary::Single {
                summary: "x".to_owned()
            }
        );
        assert_eq!(assessment.tools, vec!["Python", "SQL"]);
        assert_eq!(assessment.factors, vec!["Repetition"]);
        assert!(assessment.roadmap.is_empty());
    }

    #[test]
    fn standard_profile_truncates_tools_to_eight() {
        let tools = (0..12).map(|index| format!("tool {index}")).collect::<Vec<_>>();
        let raw = json!({ "tools": tools }).to_string();
        let assessment = normalize(&raw, ReportProfile::Standard).expect("reply should normalize");
        assert_eq!(assessment.tools.len(), 8);
        assert_eq!(assessment.risk_score, 0);
    }
}
