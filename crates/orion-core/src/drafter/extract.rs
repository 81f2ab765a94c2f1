//! Turning untrusted oracle text into a well-formed plan.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::ids::generate_plan_id;
use crate::models::{Plan, PlanMetadata, Step, ToolParams};

/// Returns the text between the first `{` and the last `}`, inclusive.
pub(crate) fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Step as an oracle may write it: every field optional.
#[derive(Debug, Deserialize)]
struct DraftedStep {
    #[serde(default)]
    step_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    tool_refs: Option<Vec<String>>,
    #[serde(default)]
    mcp_tools: Option<Vec<String>>,
    #[serde(default)]
    params: Option<ToolParams>,
    #[serde(default)]
    estimated_duration: Option<String>,
}

/// Parses oracle text into a plan.
///
/// Returns `None` when the text holds no parsable JSON object; the caller
/// then uses the fallback plan. Any object yields a plan with a non-empty id
/// and at least one step.
pub(crate) fn parse_plan(text: &str, metadata: PlanMetadata) -> Option<Plan> {
    let object = extract_object(text)?;
    let value: Value = serde_json::from_str(object).ok()?;
    let Value::Object(mut fields) = value else {
        return None;
    };

    let id = match fields.remove("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        _ => generate_plan_id(),
    };

    let steps = fields
        .remove("steps")
        .and_then(|steps| serde_json::from_value::<Vec<DraftedStep>>(steps).ok())
        .filter(|steps| !steps.is_empty())
        .map(normalize_steps)
        .unwrap_or_else(|| vec![synthetic_step(&metadata.goal)]);

    Some(Plan {
        id,
        steps,
        metadata,
    })
}

/// Gives every step a unique id and a title, keeping the oracle's order.
fn normalize_steps(drafted: Vec<DraftedStep>) -> Vec<Step> {
    let mut seen = HashSet::new();
    drafted
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let position = index + 1;
            let step_id = raw
                .step_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty() && !seen.contains(id))
                .unwrap_or_else(|| unused_step_id(&seen, position));
            seen.insert(step_id.clone());

            let title = raw
                .title
                .map(|title| title.trim().to_string())
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| format!("Step {position}"));

            let mut tool_refs: Vec<String> = Vec::new();
            for tool in raw.tool_refs.into_iter().chain(raw.mcp_tools).flatten() {
                if !tool_refs.contains(&tool) {
                    tool_refs.push(tool);
                }
            }

            Step {
                step_id,
                title,
                summary: raw.summary.unwrap_or_default(),
                tool_refs,
                params: raw.params,
                estimated_duration: raw.estimated_duration,
            }
        })
        .collect()
}

fn unused_step_id(seen: &HashSet<String>, position: usize) -> String {
    let base = format!("step_{position}");
    let mut candidate = base.clone();
    let mut suffix = 1;
    while seen.contains(&candidate) {
        suffix += 1;
        candidate = format!("{base}_{suffix}");
    }
    candidate
}

fn synthetic_step(goal: &str) -> Step {
    Step::new("step_1", "Execute plan")
        .with_summary(goal)
        .with_estimate("10m")
}

/// Deterministic plan used when the oracle is unavailable or unreadable.
pub(crate) fn fallback_plan(metadata: PlanMetadata) -> Plan {
    let steps = vec![
        Step::new("step_1", "Analyze requirements")
            .with_summary(format!("Review goal: {}", metadata.goal))
            .with_estimate("5m"),
        Step::new("step_2", "Execute plan")
            .with_summary(format!("Implement solution for {}", metadata.environment))
            .with_estimate("15m"),
    ];
    Plan {
        id: generate_plan_id(),
        steps,
        metadata,
    }
}
